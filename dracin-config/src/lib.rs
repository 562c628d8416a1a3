//! Configuration for the Dracin admin client.
//!
//! Settings come from (in order) an explicit file named by
//! `DRACIN_CONFIG_PATH`, inline JSON in `DRACIN_CONFIG_JSON`, the per-user
//! `config.toml`, or built-in defaults. A handful of environment variables
//! (including those from a `.env` file) then override individual fields so an
//! existing dashboard `.env` keeps working.

pub mod error;
pub mod loader;
pub mod models;
pub mod util;

pub use error::ConfigError;
pub use loader::{ConfigLoad, ConfigLoader, EnvLookup};
pub use models::{ClientConfig, ConfigSource, ScanDefaults};
