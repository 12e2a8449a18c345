//! Configuration management for cloudledger
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use cloudledger::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Reading ledgers from: {}", config.storage.url);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `CLOUDLEDGER__<section>__<key>`
//!
//! Examples:
//! - `CLOUDLEDGER__STORAGE__URL=gs://ledgers/pubnet`
//! - `CLOUDLEDGER__PARTITION__LEDGERS_PER_FILE=64`
//! - `CLOUDLEDGER__CACHE__MAX_BATCHES=32`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/cloudledger.toml`.
//! This can be overridden using the `CLOUDLEDGER_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{CacheConfig, Config, PartitionConfig, ServerConfig, StorageConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`CLOUDLEDGER__*`)
    /// 2. TOML file (default: `config/cloudledger.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the default sources
    pub fn load_optional(path: Option<std::path::PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let _ = dotenvy::dotenv();
                Self::load_from_path(path)
            }
            None => Self::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
url = "memory:///ledgers"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.storage.url, "memory:///ledgers");
        assert_eq!(config.partition, PartitionConfig::default());
    }

    #[test]
    fn test_validation_catches_missing_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[partition]
ledgers_per_file = 1
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::MissingStorageUrl)
        ));
    }

    #[test]
    fn test_validation_catches_zero_ledgers_per_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
url = "file:///var/lib/ledgers"

[partition]
ledgers_per_file = 0
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidLedgersPerFile(0))
        ));
    }
}
