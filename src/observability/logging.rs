//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Route output to stdout or a log file
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config; `RUST_LOG` wins when set

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::ObservabilityConfig;

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to install subscriber: {0}")]
    Init(String),
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "media_cache_proxy={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let to_stdout = config.log_path == "-";
    let writer = if to_stdout {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        // Each run starts a fresh log file.
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.log_path)
            .map_err(|source| LoggingError::Open {
                path: config.log_path.clone(),
                source,
            })?;
        BoxMakeWriter::new(Mutex::new(file))
    };

    let layer = fmt::layer().with_writer(writer).with_ansi(to_stdout);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))
}
