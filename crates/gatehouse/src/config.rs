//! Configuration management for gatehouse.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "gatehouse";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "visitors.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "GATEHOUSE_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GATEHOUSE_`, nested with `__`)
/// 2. TOML config file at `~/.config/gatehouse/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Facility configuration.
    pub facility: FacilityConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/gatehouse/visitors.db`
    pub database_path: Option<PathBuf>,
    /// Upper bound on a single store operation, in milliseconds.
    pub operation_timeout_ms: u64,
    /// How long `SQLite` waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Parking facility configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Number of visitor parking spots.
    pub total_parking_spots: u32,
    /// Fewer free spots than this counts as low availability.
    pub low_availability_threshold: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            operation_timeout_ms: 5_000,
            busy_timeout_ms: 2_000,
        }
    }
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            total_parking_spots: 200,
            low_availability_threshold: 20,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// The provider stack: defaults, then the TOML file, then the environment.
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.operation_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "operation_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.facility.total_parking_spots == 0 {
            return Err(Error::ConfigValidation {
                message: "total_parking_spots must be greater than 0".to_string(),
            });
        }

        if self.facility.low_availability_threshold > self.facility.total_parking_spots {
            return Err(Error::ConfigValidation {
                message: format!(
                    "low_availability_threshold ({}) cannot be greater than total_parking_spots ({})",
                    self.facility.low_availability_threshold, self.facility.total_parking_spots
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the operation timeout as a Duration.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.operation_timeout_ms)
    }

    /// Get the busy timeout as a Duration.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.busy_timeout_ms)
    }
}
