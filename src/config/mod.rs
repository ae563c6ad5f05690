//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (command line flags override file values)
//!     → validation.rs (semantic checks)
//!     → CacheProxyConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{read_config, ConfigError};
pub use schema::{
    CacheConfig, CacheProxyConfig, LifecycleConfig, ListenerConfig, ObservabilityConfig,
    StorageConfig, StorageEngine, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
