//! Media cache proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────┐
//!                     │                  MEDIA CACHE PROXY                     │
//!                     │                                                        │
//!   Client GET        │  ┌─────────┐    ┌──────────────┐    ┌──────────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│    proxy     │───▶│    store     │  │
//!                     │  │ server  │    │   handler    │    │ (redb/memory)│  │
//!                     │  └─────────┘    └──────┬───────┘    └──────────────┘  │
//!                     │                        │ miss                          │
//!                     │                        ▼                               │
//!                     │                 ┌──────────────┐                       │
//!                     │                 │   upstream   │                       │
//!                     │                 │ pool (r.r.)  │───────────────────────┼──▶ Origins
//!                     │                 └──────────────┘                       │
//!                     │                                                        │
//!                     │  config · lifecycle (signals, drain, sync) · observability
//!                     └───────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use media_cache_proxy::config::Cli;
use media_cache_proxy::http::HttpServer;
use media_cache_proxy::lifecycle::{signals, startup, Shutdown};
use media_cache_proxy::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("media-cache-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstreams = ?config.upstream.urls,
        storage_engine = ?config.storage.engine,
        storage_path = ?config.storage.path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Metrics disabled");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let handler = match startup::build_handler(&config) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(handler, &config.lifecycle);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
