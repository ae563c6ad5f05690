//! Shutdown coordination for the proxy.

use tokio::sync::broadcast;

use crate::store::CacheStore;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Flush the store to disk as the final durability barrier.
///
/// Failure is logged and reported as `false`; it never blocks exit.
pub async fn sync_store(store: &dyn CacheStore) -> bool {
    match store.sync().await {
        Ok(()) => {
            tracing::info!("Storage synced");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to sync storage. Might have data loss");
            false
        }
    }
}
