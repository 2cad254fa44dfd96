//! Application configuration.
//!
//! Loaded from YAML files and environment variables via the `config` crate.
//! Every field has a default, so an empty environment yields a working
//! local setup.

use serde::Deserialize;

use crate::bus::MessagingConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "TRIPLINE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "TRIPLINE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "TRIPLINE_LOG";
/// Legacy environment variable carrying the broker URI.
pub const RABBITMQ_URI_ENV_VAR: &str = "RABBITMQ_URI";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker configuration.
    pub messaging: MessagingConfig,
    /// Trip service behavior.
    pub trip_service: TripServiceConfig,
}

/// Trip service settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TripServiceConfig {
    /// Create one pending trip at startup for manual end-to-end runs.
    pub seed_demo_trip: bool,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. `RABBITMQ_URI` for the broker URL
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("messaging.amqp.url", std::env::var(RABBITMQ_URI_ENV_VAR).ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
