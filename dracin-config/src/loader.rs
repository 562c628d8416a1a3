use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::models::{ClientConfig, ConfigSource};
use crate::util::normalize_api_base;

/// Path to a TOML or JSON config file.
pub const CONFIG_PATH_VAR: &str = "DRACIN_CONFIG_PATH";
/// Inline JSON config.
pub const CONFIG_JSON_VAR: &str = "DRACIN_CONFIG_JSON";
/// Overrides `state_dir`.
pub const STATE_DIR_VAR: &str = "DRACIN_STATE_DIR";
/// Checked in order; the first non-blank value wins.
pub const API_BASE_VARS: &[&str] =
    &["ADMIN_API_BASE", "NEXT_PUBLIC_ADMIN_API_BASE"];
/// Site origin; `/api/admin` is appended to form the API base.
pub const BASE_URL_VAR: &str = "BASE_URL";
/// Path appended to `BASE_URL`.
pub const API_PREFIX: &str = "/api/admin";

/// Environment accessor used by the loader.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Effective configuration plus the layer it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    /// The effective configuration, already validated.
    pub config: ClientConfig,
    /// Layer it was read from.
    pub source: ConfigSource,
}

/// Resolves a [`ClientConfig`] from env, files and defaults.
pub struct ConfigLoader {
    env: EnvLookup,
    default_file: Option<PathBuf>,
    load_dotenv: bool,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("default_file", &self.default_file)
            .field("load_dotenv", &self.load_dotenv)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader bound to the process environment, `.env` and the per-user
    /// config file.
    pub fn new() -> Self {
        Self {
            env: Box::new(|key| std::env::var(key).ok()),
            default_file: default_config_file(),
            load_dotenv: true,
        }
    }

    /// Loader that reads variables from `lookup` only. No `.env` file and no
    /// per-user config file are consulted unless set with
    /// [`ConfigLoader::with_default_file`].
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env: Box::new(lookup),
            default_file: None,
            load_dotenv: false,
        }
    }

    /// Replace the per-user config file location. `None` disables it.
    pub fn with_default_file(mut self, path: Option<PathBuf>) -> Self {
        self.default_file = path;
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|value| !value.trim().is_empty())
    }

    /// Resolve the effective configuration.
    /// Evaluation order:
    /// 1) `$DRACIN_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$DRACIN_CONFIG_JSON` (inline JSON),
    /// 3) the per-user `config.toml` when it exists,
    /// 4) defaults.
    ///
    /// Environment overrides are applied on top and the result is validated.
    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        if self.load_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => debug!(path = %path.display(), "loaded .env"),
                Err(err) if err.not_found() => {}
                Err(err) => warn!(error = %err, "ignoring unreadable .env"),
            }
        }

        let (mut config, source) = self.load_base()?;
        self.apply_overrides(&mut config);
        config.validate().context("invalid client configuration")?;

        debug!(
            api_base = %config.api_base,
            source = ?source,
            "client configuration resolved"
        );
        Ok(ConfigLoad { config, source })
    }

    fn load_base(&self) -> anyhow::Result<(ClientConfig, ConfigSource)> {
        if let Some(path_str) = self.var(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path_str.trim());
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = self.var(CONFIG_JSON_VAR) {
            let parsed = parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            return Ok((parsed, ConfigSource::EnvInline));
        }

        if let Some(path) = self.default_file.as_ref()
            && path.exists()
        {
            let config = load_from_file(path)?;
            return Ok((config, ConfigSource::File(path.clone())));
        }

        Ok((ClientConfig::default(), ConfigSource::Default))
    }

    fn apply_overrides(&self, config: &mut ClientConfig) {
        let explicit = API_BASE_VARS
            .iter()
            .find_map(|key| self.var(key))
            .and_then(|raw| normalize_api_base(&raw));
        let derived = || {
            self.var(BASE_URL_VAR)
                .and_then(|raw| normalize_api_base(&raw))
                .map(|base| format!("{base}{API_PREFIX}"))
        };

        if let Some(base) = explicit.or_else(derived) {
            config.api_base = base;
        } else if let Some(base) = normalize_api_base(&config.api_base) {
            config.api_base = base;
        }

        if let Some(dir) = self.var(STATE_DIR_VAR) {
            config.state_dir = Some(PathBuf::from(dir.trim()));
        }
    }
}

/// `<config dir>/dracin/config.toml` for the current platform.
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dracin")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Read a config file. `.json` and `.toml` pick the format; anything else
/// tries TOML, then JSON.
pub fn load_from_file(path: &Path) -> anyhow::Result<ClientConfig> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read client config from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents).with_context(|| {
            format!("invalid client config {}", path.display())
        }),
        Some("toml") => toml::from_str(&contents).map_err(|err| {
            anyhow!("invalid client config {}: {}", path.display(), err)
        }),
        _ => parse_from_str(&contents, &path.display().to_string()),
    }
}

/// Parse as TOML, falling back to JSON. `origin` is only used in errors.
pub fn parse_from_str(
    contents: &str,
    origin: &str,
) -> anyhow::Result<ClientConfig> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse client config {}: toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

/// Parse inline JSON config.
pub fn parse_json(raw: &str) -> anyhow::Result<ClientConfig> {
    serde_json::from_str(raw)
        .map_err(|err| anyhow!("invalid client config json: {err}"))
}
