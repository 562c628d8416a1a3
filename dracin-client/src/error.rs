//! Errors surfaced by the API client.

use dracin_model::ModelError;
use thiserror::Error;

/// Failure of a single API interaction.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No access token is held; nothing was sent.
    #[error("not signed in")]
    NotAuthenticated,

    /// The access token was rejected and could not be renewed. The session
    /// has been cleared.
    #[error("session expired, please sign in again")]
    SessionExpired,

    /// The server answered but did not accept the request.
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// Connection, TLS or timeout failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The reply did not have the expected shape.
    #[error(transparent)]
    Decode(#[from] ModelError),

    /// The request was refused locally before anything was sent.
    #[error("{0}")]
    Invalid(String),

    /// The scan event stream could not be opened.
    #[error("event stream unavailable: {0}")]
    Stream(String),
}

impl ApiError {
    pub(crate) fn rejected(
        status: reqwest::StatusCode,
        code: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        ApiError::Rejected {
            status: status.as_u16(),
            code,
            message: message.into(),
        }
    }

    /// Whether the caller needs to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated | ApiError::SessionExpired)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(ModelError::Decode(err))
    }
}
