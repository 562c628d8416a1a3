use thiserror::Error;

/// Errors produced while interpreting wire payloads.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("envelope carried no data")]
    MissingData,

    #[error("invalid identifier: {0:?}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
