use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use htb_core::{
    config::Config, inference::InferencePort, messaging::port::MessagingPort, relay::Relay,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Run Telegram long polling until Ctrl-C.
///
/// The token is checked with `getMe` first, so a bad token fails startup
/// instead of looping on polling errors.
pub async fn run_polling(
    cfg: Arc<Config>,
    inference: Arc<dyn InferencePort>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_token.clone());

    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("telegram authentication failed: {e}"))?;
    tracing::info!("htb started: @{}", me.username());

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(Relay::new(messenger, inference).with_bot_username(me.username()));

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    // Updates of one chat are handled in order; different chats run concurrently.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .default_handler(|upd| async move {
            tracing::debug!(update_id = upd.id, "unhandled update kind");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("telegram polling stopped");
    Ok(())
}
