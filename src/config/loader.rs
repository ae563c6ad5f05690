//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::CacheProxyConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML configuration file without validating it.
///
/// Validation is deferred so command line overrides can fill in missing values first.
pub fn read_config(path: &Path) -> Result<CacheProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CacheProxyConfig = toml::from_str(&content)?;
    Ok(config)
}
