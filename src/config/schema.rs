//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the cache proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the cache proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CacheProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin servers and connection reuse settings.
    pub upstream: UpstreamConfig,

    /// Persistent object store settings.
    pub storage: StorageConfig,

    /// Which request paths are cacheable.
    pub cache: CacheConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// HTTP binding port.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Origin pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URLs of the origin servers. Each must include its scheme.
    pub urls: Vec<String>,

    /// Number of idle keepalive connections kept per upstream.
    pub keepalive: usize,

    /// How long an idle upstream connection is kept open, in seconds.
    pub idle_timeout_secs: u64,

    /// Optional TCP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            keepalive: 64,
            idle_timeout_secs: 600,
            connect_timeout_secs: None,
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    /// Persistent redb database under `path`.
    Redb,
    /// Process-local map, lost on exit.
    Memory,
}

/// Object store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend used to hold cached objects.
    pub engine: StorageEngine,

    /// Data directory. Required for the redb engine.
    pub path: Option<String>,

    /// Largest object that will be stored, in bytes.
    pub max_value_size: u64,

    /// Longest key that will be stored, in bytes.
    pub max_key_size: u64,

    /// Segment size in bytes: how much is written between durable checkpoints.
    /// Does not limit how much the store holds.
    pub max_file_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            engine: StorageEngine::Redb,
            path: None,
            max_value_size: 10 * 1024 * 1024, // 10MB
            max_key_size: 200,
            max_file_size: 2 * 1024 * 1024 * 1024, // 2GB
        }
    }
}

/// Cacheable content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// File extensions (case-insensitive, with or without leading dot) that may be served.
    pub allowed_extensions: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["jpg", "jpeg", "png", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Time in-flight requests get to finish after a stop signal, in seconds.
    pub grace_period_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 120,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log destination: "-" for stdout, otherwise a file path.
    pub log_path: String,

    /// Emit JSON lines instead of human readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_path: "-".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
