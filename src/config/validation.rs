use super::models::Config;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("storage.url is required")]
    MissingStorageUrl,

    #[error("Invalid storage.url '{url}': {reason}")]
    InvalidStorageUrl { url: String, reason: String },

    #[error("partition.ledgers_per_file must be at least 1, got {0}")]
    InvalidLedgersPerFile(u32),

    #[error("partition.files_per_partition must be at least 1, got {0}")]
    InvalidFilesPerPartition(u32),

    #[error("partition.file_suffix must not be empty")]
    EmptyFileSuffix,

    #[error("partition.file_suffix '{0}' must not contain '/'")]
    InvalidFileSuffix(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_storage(config)?;
    validate_partition(config)?;
    Ok(())
}

/// Storage URL must be present and parseable; the scheme is checked when the
/// store is built
fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    let url = config.storage.url.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingStorageUrl);
    }

    Url::parse(url).map_err(|err| ValidationError::InvalidStorageUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    Ok(())
}

fn validate_partition(config: &Config) -> Result<(), ValidationError> {
    let partition = &config.partition;

    if partition.ledgers_per_file < 1 {
        return Err(ValidationError::InvalidLedgersPerFile(
            partition.ledgers_per_file,
        ));
    }

    if partition.files_per_partition < 1 {
        return Err(ValidationError::InvalidFilesPerPartition(
            partition.files_per_partition,
        ));
    }

    if partition.file_suffix.is_empty() {
        return Err(ValidationError::EmptyFileSuffix);
    }

    if partition.file_suffix.contains('/') {
        return Err(ValidationError::InvalidFileSuffix(
            partition.file_suffix.clone(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.storage.url = "gs://ledgers/pubnet".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_storage_url() {
        let mut config = create_test_config();
        config.storage.url = "  ".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::MissingStorageUrl)));
    }

    #[test]
    fn test_unparseable_storage_url() {
        let mut config = create_test_config();
        config.storage.url = "ledgers/pubnet".to_string();

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidStorageUrl { .. })
        ));
    }

    #[test]
    fn test_zero_ledgers_per_file() {
        let mut config = create_test_config();
        config.partition.ledgers_per_file = 0;

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidLedgersPerFile(0))
        ));
    }

    #[test]
    fn test_zero_files_per_partition() {
        let mut config = create_test_config();
        config.partition.files_per_partition = 0;

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidFilesPerPartition(0))
        ));
    }

    #[test]
    fn test_bad_file_suffix() {
        let mut config = create_test_config();
        config.partition.file_suffix = String::new();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyFileSuffix)
        ));

        config.partition.file_suffix = ".xdr/gz".to_string();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidFileSuffix(_))
        ));
    }
}
