use async_trait::async_trait;

use crate::{domain::ChatId, messaging::types::ChatAction, Result};

/// Outbound side of the messenger.
///
/// Text is sent as-is (no parse mode): model output is not trusted markup.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;
}
