//! Command line flags.
//!
//! Every flag is optional and overrides the matching value from the config file
//! (or the built-in default when no file is given).

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::CacheProxyConfig;

#[derive(Debug, Default, Parser)]
#[command(name = "media-cache-proxy")]
#[command(about = "Caching reverse proxy for static media assets", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// HTTP binding port
    #[arg(long)]
    pub port: Option<u16>,

    /// Number of keepalive connections to each upstream
    #[arg(long)]
    pub keepalive: Option<usize>,

    /// A comma-separated list of upstream servers, including the scheme
    #[arg(long, value_delimiter = ',')]
    pub upstreams: Option<Vec<String>>,

    /// Path to the storage data directory
    #[arg(long)]
    pub db_path: Option<String>,

    /// Path to log file, "-" for stdout
    #[arg(long)]
    pub log: Option<String>,

    /// Storage segment size (bytes written between durable checkpoints)
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Maximum stored object size (bytes)
    #[arg(long)]
    pub max_value_size: Option<u64>,

    /// Maximum key size (bytes)
    #[arg(long)]
    pub max_key_size: Option<u64>,
}

impl Cli {
    /// Apply the flags that were given on top of `config`.
    pub fn apply_overrides(&self, config: &mut CacheProxyConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(keepalive) = self.keepalive {
            config.upstream.keepalive = keepalive;
        }
        if let Some(upstreams) = &self.upstreams {
            config.upstream.urls = upstreams
                .iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
        if let Some(path) = &self.db_path {
            config.storage.path = Some(path.clone());
        }
        if let Some(log) = &self.log {
            config.observability.log_path = log.clone();
        }
        if let Some(size) = self.max_file_size {
            config.storage.max_file_size = size;
        }
        if let Some(size) = self.max_value_size {
            config.storage.max_value_size = size;
        }
        if let Some(size) = self.max_key_size {
            config.storage.max_key_size = size;
        }
    }
}
