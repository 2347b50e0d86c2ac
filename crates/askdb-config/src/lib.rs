//! # askdb-config
//!
//! Layered configuration loading for askdb using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ASKDB_*` prefix, `__` as separator)
//! 2. Project-level `.askdb/config.toml`
//! 3. User-level `~/.config/askdb/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ASKDB_ORACLE__API_KEY` -> `oracle.api_key`,
//! `ASKDB_DATABASE__PORT` -> `database.port`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use askdb_config::AskConfig;
//!
//! let config = AskConfig::load_with_dotenv().expect("config");
//!
//! if config.oracle.is_configured() {
//!     println!("model: {}", config.oracle.model);
//! }
//! ```

mod database;
mod error;
mod oracle;
mod routing;
mod training;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use oracle::OracleConfig;
pub use routing::RoutingConfig;
pub use training::TrainingConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AskConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl AskConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".askdb/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("ASKDB_").split("__"))
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.training.history_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "training.history_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.training.preview_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "training.preview_chars".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "oracle.temperature".into(),
                reason: format!("{} is outside 0.0..=2.0", self.oracle.temperature),
            });
        }
        Ok(())
    }

    /// Return the oracle section or fail if it lacks credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when the key or URL is missing.
    pub fn require_oracle(&self) -> Result<&OracleConfig, ConfigError> {
        if self.oracle.is_configured() {
            Ok(&self.oracle)
        } else {
            Err(ConfigError::NotConfigured {
                section: "oracle".into(),
            })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("askdb").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
