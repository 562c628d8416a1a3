use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Local development backend.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api/admin";
/// Scan log lines kept in memory.
pub const DEFAULT_LOG_CAPACITY: usize = 300;
/// Scan log lines mirrored to storage.
pub const DEFAULT_PERSISTED_LOG_LINES: usize = 2;
/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Layer that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Built-in defaults only.
    #[default]
    Default,
    /// File named by `DRACIN_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// `DRACIN_CONFIG_JSON`.
    EnvInline,
    /// The per-user config file.
    File(PathBuf),
}

/// Everything the admin client needs to talk to the panel API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the admin API, e.g. `https://host/api/admin`. Stored
    /// without a trailing slash.
    pub api_base: String,
    /// Per-request timeout. Does not apply to the scan event stream.
    pub request_timeout_secs: u64,
    /// Where the session, log tail and flash messages are persisted. Falls
    /// back to the platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    /// Scan log lines kept in memory.
    pub log_capacity: usize,
    /// Scan log lines mirrored to storage so the next run can show them.
    pub persisted_log_lines: usize,
    /// Fallbacks for `scan start`.
    pub scan: ScanDefaults,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            state_dir: None,
            log_capacity: DEFAULT_LOG_CAPACITY,
            persisted_log_lines: DEFAULT_PERSISTED_LOG_LINES,
            scan: ScanDefaults::default(),
        }
    }
}

impl ClientConfig {
    /// `request_timeout_secs` as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse `api_base`, accepting only http and https.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_base).map_err(|source| {
            ConfigError::InvalidApiBase {
                value: self.api_base.clone(),
                source,
            }
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::UnsupportedScheme {
                value: self.api_base.clone(),
            }),
        }
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_base_url()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.persisted_log_lines == 0 {
            return Err(ConfigError::NoPersistedLines);
        }
        if self.log_capacity < self.persisted_log_lines {
            return Err(ConfigError::LogCapacityTooSmall {
                capacity: self.log_capacity,
                persisted: self.persisted_log_lines,
            });
        }
        Ok(())
    }
}

/// Values the CLI falls back to when a start-scan flag is omitted. They are
/// validated like any other input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanDefaults {
    /// Folders to scan when none are given.
    pub top_folders: Vec<String>,
    /// Fallback for `--batch-size`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i64>,
    /// Fallback for `--pause-ms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_ms: Option<i64>,
    /// Fallback for `--interval-ms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.log_capacity, 300);
        assert_eq!(config.persisted_log_lines, 2);
    }

    #[test]
    fn rejects_capacity_below_persisted_tail() {
        let config = ClientConfig {
            log_capacity: 1,
            persisted_log_lines: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LogCapacityTooSmall {
                capacity: 1,
                persisted: 2
            })
        ));
    }

    #[test]
    fn rejects_non_http_base() {
        let config = ClientConfig {
            api_base: "ftp://files.example/api".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_base = "https://panel.example/api/admin"

            [scan]
            top_folders = ["ANIME_A"]
            batch_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.scan.top_folders, vec!["ANIME_A".to_string()]);
        assert_eq!(config.scan.batch_size, Some(10));
        assert_eq!(config.scan.pause_ms, None);
    }
}
