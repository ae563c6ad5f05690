//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT, SIGTERM or SIGQUIT
//! - Translate the first one into the shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A handler that cannot be installed is logged and never fires

use crate::lifecycle::shutdown::Shutdown;

/// Resolve when the process is asked to stop.
pub async fn stop_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let wait = |kind: SignalKind, name: &'static str| async move {
            match signal(kind) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::error!(signal = name, error = %e, "Failed to install signal handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => {}
            _ = wait(SignalKind::terminate(), "SIGTERM") => {}
            _ = wait(SignalKind::quit(), "SIGQUIT") => {}
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}

/// Spawn a task that triggers `shutdown` on the first stop signal.
pub fn spawn_signal_listener(shutdown: std::sync::Arc<Shutdown>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        stop_signal().await;
        tracing::info!("Received stop signal. Prepare for shutting down");
        shutdown.trigger();
    })
}
