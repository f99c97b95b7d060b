use std::sync::Arc;

use crate::{
    domain::ChatId,
    inference::{InferencePort, InferenceReply},
    messaging::{
        port::MessagingPort,
        types::{ChatAction, IncomingUpdate},
    },
    Result,
};

pub const HELP_TEXT: &str = "I'm an AI assistant bot. Just send me a message and I'll respond!";

pub const APOLOGY_TEXT: &str =
    "Sorry, I encountered an error processing your request. Please try again later.";

pub fn greeting(first_name: &str) -> String {
    format!("Hi {first_name}! I'm your AI assistant. How can I help you today?")
}

/// Stateless relay between the messenger and the inference backend.
///
/// Every reply is addressed with the chat id of the event being handled.
#[derive(Clone)]
pub struct Relay {
    messenger: Arc<dyn MessagingPort>,
    inference: Arc<dyn InferencePort>,
    bot_username: Option<String>,
}

impl Relay {
    pub fn new(messenger: Arc<dyn MessagingPort>, inference: Arc<dyn InferencePort>) -> Self {
        Self {
            messenger,
            inference,
            bot_username: None,
        }
    }

    /// Commands of the form `/cmd@other_bot` are ignored once this is set.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => {
                if !cmd.is_addressed_to(self.bot_username.as_deref()) {
                    tracing::debug!(
                        chat_id = cmd.chat_id.0,
                        target = cmd.target.as_deref().unwrap_or(""),
                        "ignoring command for another bot"
                    );
                    return Ok(());
                }
                match cmd.name.as_str() {
                    "start" => self.on_start(cmd.chat_id, &cmd.first_name).await,
                    "help" => self.on_help(cmd.chat_id).await,
                    other => {
                        tracing::debug!(
                            chat_id = cmd.chat_id.0,
                            command = other,
                            "ignoring command"
                        );
                        Ok(())
                    }
                }
            }
            IncomingUpdate::Text(msg) => self.on_text(msg.chat_id, &msg.text).await,
        }
    }

    pub async fn on_start(&self, chat_id: ChatId, first_name: &str) -> Result<()> {
        self.messenger
            .send_text(chat_id, &greeting(first_name))
            .await
    }

    pub async fn on_help(&self, chat_id: ChatId) -> Result<()> {
        self.messenger.send_text(chat_id, HELP_TEXT).await
    }

    /// Relay one text message: typing indicator, one inference call, one reply.
    ///
    /// Inference or reply failures are logged and answered with the apology.
    pub async fn on_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.messenger
            .send_chat_action(chat_id, ChatAction::Typing)
            .await?;

        if let Err(e) = self.reply_with_inference(chat_id, text).await {
            tracing::error!(chat_id = chat_id.0, "Error getting AI response: {e}");
            self.messenger.send_text(chat_id, APOLOGY_TEXT).await?;
        }
        Ok(())
    }

    async fn reply_with_inference(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let reply = self.inference.get_response(text).await?;
        if let InferenceReply::Fallback { status } = &reply {
            tracing::warn!(chat_id = chat_id.0, status, "inference endpoint returned non-200");
        }
        self.messenger.send_text(chat_id, reply.text()).await
    }
}
