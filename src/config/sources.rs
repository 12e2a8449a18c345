use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "CLOUDLEDGER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/cloudledger.toml";
const ENV_PREFIX: &str = "CLOUDLEDGER";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    load_from_sources(default_config_path())
}

/// Config file path from `CLOUDLEDGER_CONFIG`, falling back to the default
pub fn default_config_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // CLOUDLEDGER__STORAGE__URL -> storage.url
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.partition.files_per_partition, 64000);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
url = "s3://ledger-exports/testnet"

[storage.options]
aws_region = "us-east-1"

[partition]
ledgers_per_file = 64
files_per_partition = 10
file_suffix = ".xdr.zst"

[cache]
max_batches = 16

[server]
bind_addr = "127.0.0.1:9000"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.storage.url, "s3://ledger-exports/testnet");
        assert_eq!(config.storage.options["aws_region"], "us-east-1");
        assert_eq!(config.partition.ledgers_per_file, 64);
        assert_eq!(config.partition.files_per_partition, 10);
        assert_eq!(config.partition.file_suffix, ".xdr.zst");
        assert_eq!(config.cache.max_batches, 16);
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[partition\nledgers_per_file = ").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }
}
