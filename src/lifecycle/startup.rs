//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (file, then command line overrides, then validation)
//! - Open the store and build the upstream pool
//! - Assemble the request handler
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is served
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use crate::config::{
    read_config, validate_config, CacheProxyConfig, Cli, ConfigError, StorageConfig,
    StorageEngine,
};
use crate::proxy::{AllowedExtensions, RequestHandler};
use crate::store::{CacheStore, MemoryStore, RedbStore, StoreError, StoreLimits};
use crate::upstream::{PoolError, UpstreamPool};

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open storage: {0}")]
    Store(#[from] StoreError),
    #[error("failed to build upstream pool: {0}")]
    Pool(#[from] PoolError),
}

/// Build the effective configuration from the command line.
pub fn resolve_config(cli: &Cli) -> Result<CacheProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => CacheProxyConfig::default(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Open the configured store.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn CacheStore>, StoreError> {
    let limits = StoreLimits {
        max_key_size: config.max_key_size,
        max_value_size: config.max_value_size,
    };

    match config.engine {
        StorageEngine::Redb => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| StoreError::Engine("storage path is required".to_string()))?;
            Ok(Arc::new(RedbStore::open(path, limits, config.max_file_size)?))
        }
        StorageEngine::Memory => {
            tracing::warn!("Using in-memory storage; cached objects are lost on exit");
            Ok(Arc::new(MemoryStore::new(limits)))
        }
    }
}

/// Build the request handler from a validated configuration.
pub fn build_handler(config: &CacheProxyConfig) -> Result<RequestHandler, StartupError> {
    let store = open_store(&config.storage)?;
    let pool = UpstreamPool::from_config(&config.upstream)?;
    let extensions = AllowedExtensions::new(&config.cache.allowed_extensions);

    tracing::info!(
        upstreams = pool.len(),
        keepalive = config.upstream.keepalive,
        extensions = ?config.cache.allowed_extensions,
        "Cache handler ready"
    );

    Ok(RequestHandler::new(extensions, store, Arc::new(pool)))
}
