//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate upstream URLs (scheme and host present)
//! - Validate value ranges (sizes > 0, keepalive > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CacheProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::{CacheProxyConfig, StorageEngine};
use crate::proxy::extension::normalize_extension;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one upstream is required")]
    NoUpstreams,
    #[error("invalid upstream '{url}': {reason}")]
    InvalidUpstream { url: String, reason: String },
    #[error("upstream.keepalive must be greater than 0")]
    ZeroKeepalive,
    #[error("storage.path is required for the redb engine")]
    MissingStoragePath,
    #[error("storage.{0} must be greater than 0")]
    ZeroSize(&'static str),
    #[error("cache.allowed_extensions must not be empty")]
    NoExtensions,
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &CacheProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.urls.is_empty() {
        errors.push(ValidationError::NoUpstreams);
    }
    for raw in &config.upstream.urls {
        if let Err(reason) = check_upstream_url(raw) {
            errors.push(ValidationError::InvalidUpstream {
                url: raw.clone(),
                reason,
            });
        }
    }
    if config.upstream.keepalive == 0 {
        errors.push(ValidationError::ZeroKeepalive);
    }

    let storage = &config.storage;
    if storage.engine == StorageEngine::Redb
        && storage.path.as_deref().map_or(true, |p| p.trim().is_empty())
    {
        errors.push(ValidationError::MissingStoragePath);
    }
    if storage.max_value_size == 0 {
        errors.push(ValidationError::ZeroSize("max_value_size"));
    }
    if storage.max_key_size == 0 {
        errors.push(ValidationError::ZeroSize("max_key_size"));
    }
    if storage.max_file_size == 0 {
        errors.push(ValidationError::ZeroSize("max_file_size"));
    }

    if config
        .cache
        .allowed_extensions
        .iter()
        .all(|e| normalize_extension(e).is_empty())
    {
        errors.push(ValidationError::NoExtensions);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
