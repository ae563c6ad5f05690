//! Upstream pool management.
//!
//! # Responsibilities
//! - Hold the configured origin endpoints for the process lifetime
//! - Hand out the next endpoint in strict round-robin order

use std::sync::Arc;

use crate::config::UpstreamConfig;
use crate::upstream::{
    origin::{FetchError, Origin, OriginClient},
    round_robin::RoundRobin,
};

/// Error type for pool construction.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("upstream pool needs at least one endpoint")]
    Empty,
    #[error(transparent)]
    Endpoint(#[from] FetchError),
}

/// Fixed set of origins selected by round robin.
///
/// No health state is tracked: a failing origin is still picked on its turn.
pub struct UpstreamPool {
    endpoints: Vec<Arc<dyn Origin>>,
    cursor: RoundRobin,
}

impl UpstreamPool {
    /// Create a pool over `endpoints`. Fails if the list is empty.
    pub fn new(endpoints: Vec<Arc<dyn Origin>>) -> Result<Self, PoolError> {
        if endpoints.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self {
            endpoints,
            cursor: RoundRobin::new(),
        })
    }

    /// Build one `OriginClient` per configured URL.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, PoolError> {
        let mut endpoints: Vec<Arc<dyn Origin>> = Vec::with_capacity(config.urls.len());
        for url in &config.urls {
            let client = OriginClient::new(url, config)?;
            tracing::debug!(upstream = %url, keepalive = config.keepalive, "Upstream registered");
            endpoints.push(Arc::new(client));
        }
        Self::new(endpoints)
    }

    /// Select the next endpoint.
    pub fn next(&self) -> &Arc<dyn Origin> {
        let index = self.cursor.next_index(self.endpoints.len());
        &self.endpoints[index]
    }

    /// Number of endpoints in the pool.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; an empty pool cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Names of all endpoints, in selection order.
    pub fn names(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.name().to_string()).collect()
    }
}

impl std::fmt::Debug for UpstreamPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamPool")
            .field("endpoints", &self.names())
            .field("cursor", &self.cursor)
            .finish()
    }
}
