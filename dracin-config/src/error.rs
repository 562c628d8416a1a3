use thiserror::Error;

/// Guard rails checked after a configuration has been assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `api_base` is not a URL.
    #[error("invalid API base URL {value:?}: {source}")]
    InvalidApiBase {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// `api_base` uses a scheme other than http or https.
    #[error("API base URL {value:?} must use http or https")]
    UnsupportedScheme { value: String },

    /// `request_timeout_secs` is zero.
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    /// `persisted_log_lines` is zero.
    #[error("persisted_log_lines must be at least 1")]
    NoPersistedLines,

    /// The in-memory log cannot hold the persisted tail.
    #[error(
        "log_capacity ({capacity}) must be at least persisted_log_lines ({persisted})"
    )]
    LogCapacityTooSmall { capacity: usize, persisted: usize },
}
