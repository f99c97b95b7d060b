//! Telegram update handlers.
//!
//! Converts a teloxide `Message` into a messenger-agnostic `IncomingUpdate` and
//! hands it to the relay. Non-text messages are dropped.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use htb_core::{domain::ChatId, messaging::types::IncomingUpdate, relay::Relay};

pub async fn handle_message(msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    let Some(update) = to_update(&msg) else {
        tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };

    let chat_id = update.chat_id().0;
    tracing::debug!(chat_id, "handling update");

    // Relay errors are logged here; the dispatcher only sees Telegram request errors.
    if let Err(e) = relay.handle(update).await {
        tracing::error!(chat_id, "failed to handle update: {e}");
    }

    Ok(())
}

fn to_update(msg: &Message) -> Option<IncomingUpdate> {
    update_from_parts(
        msg.chat.id.0,
        msg.from().map(|u| u.first_name.as_str()),
        msg.text(),
    )
}

fn update_from_parts(
    chat_id: i64,
    first_name: Option<&str>,
    text: Option<&str>,
) -> Option<IncomingUpdate> {
    let text = text?;
    Some(IncomingUpdate::from_text(
        ChatId(chat_id),
        first_name.unwrap_or("there"),
        text,
    ))
}
