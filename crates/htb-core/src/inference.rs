use async_trait::async_trait;

use crate::Result;

/// Returned in place of model output when the endpoint answers with a non-200 status.
pub const FALLBACK_TEXT: &str =
    "I'm sorry, I couldn't process that request right now. Please try again later.";

/// Outcome of a completed inference call.
///
/// Transport and decoding failures are `Err`; a non-success status is not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceReply {
    Generated(String),
    Fallback { status: u16 },
}

impl InferenceReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Fallback { .. } => FALLBACK_TEXT,
        }
    }
}

/// Text-generation backend used by the relay.
#[async_trait]
pub trait InferencePort: Send + Sync {
    async fn get_response(&self, text: &str) -> Result<InferenceReply>;
}
