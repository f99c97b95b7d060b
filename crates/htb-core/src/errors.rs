/// Core error type for the relay.
///
/// Adapter crates map their library errors (reqwest, teloxide) into this type so
/// the relay can log failures uniformly before picking the user-facing text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("messaging error: {0}")]
    Messaging(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
