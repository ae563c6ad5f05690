//! Cache-aside request handling.
//!
//! # Responsibilities
//! - Reject paths whose extension is not allowed
//! - Serve stored objects
//! - On a miss, fetch once from the next origin and store verified 200 bodies
//! - Classify every request into a single `Outcome`
//!
//! # Design Decisions
//! - Lookup errors degrade to a miss; storage trouble never fails a request by itself
//! - Only a 200 is stored, so redirects and errors never poison the cache
//! - Store-then-serve: if the write fails the fetched body is not served
//! - Exactly one upstream attempt per request, no retries
//! - Once closed, no request writes to the store; the final sync sees every put

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header};
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::observability::metrics;
use crate::proxy::extension::AllowedExtensions;
use crate::store::CacheStore;
use crate::upstream::UpstreamPool;

/// Terminal result of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Extension not allowed.
    Rejected,
    /// Served from the store.
    Hit(Bytes),
    /// Fetched from origin and stored.
    Populated(Bytes),
    /// Origin answered 301/302.
    Redirect {
        status: StatusCode,
        location: Option<HeaderValue>,
    },
    /// Origin answered with another status; relayed without a body.
    PassThrough(StatusCode),
    /// No response could be obtained from the origin.
    TransportError,
    /// The origin body could not be read or stored.
    ProcessingError,
}

impl Outcome {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::Hit(_) => "hit",
            Outcome::Populated(_) => "miss",
            Outcome::Redirect { .. } => "redirect",
            Outcome::PassThrough(_) => "passthrough",
            Outcome::TransportError => "upstream_error",
            Outcome::ProcessingError => "processing_error",
        }
    }
}

/// Runs the cache-aside state machine for one request at a time.
pub struct RequestHandler {
    extensions: AllowedExtensions,
    store: Arc<dyn CacheStore>,
    pool: Arc<UpstreamPool>,
    /// Set by `close`. Puts hold the read side for their whole duration.
    closed: RwLock<bool>,
}

impl RequestHandler {
    pub fn new(
        extensions: AllowedExtensions,
        store: Arc<dyn CacheStore>,
        pool: Arc<UpstreamPool>,
    ) -> Self {
        Self {
            extensions,
            store,
            pool,
            closed: RwLock::new(false),
        }
    }

    /// Stop writing to the store.
    ///
    /// Waits for puts already under way. Requests that finish later are
    /// answered as processing errors and leave the store untouched.
    pub async fn close(&self) {
        *self.closed.write().await = true;
    }

    /// The store behind this handler.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// The upstream pool behind this handler.
    pub fn pool(&self) -> &Arc<UpstreamPool> {
        &self.pool
    }

    /// Handle a request for `key` (the escaped request path).
    pub async fn handle(&self, key: &str) -> Outcome {
        if !self.extensions.allows(key) {
            return Outcome::Rejected;
        }

        match self.store.get(key).await {
            Ok(Some(value)) => return Outcome::Hit(value),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Cache lookup failed, treating as miss");
            }
        }

        self.fetch_and_populate(key).await
    }

    async fn fetch_and_populate(&self, key: &str) -> Outcome {
        let origin = self.pool.next();

        let response = match origin.fetch(key).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(upstream = %origin.name(), key = %key, error = %e, "Unable to request from upstream");
                metrics::record_upstream(origin.name(), "error");
                return Outcome::TransportError;
            }
        };

        let status = response.status;
        metrics::record_upstream(origin.name(), status.as_str());

        match status {
            StatusCode::OK => {
                let body = match response.bytes().await {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::error!(upstream = %origin.name(), key = %key, error = %e, "Unable to read response from upstream");
                        return Outcome::ProcessingError;
                    }
                };
                let closed = self.closed.read().await;
                if *closed {
                    tracing::warn!(key = %key, "Storage closed for shutdown, dropping response");
                    return Outcome::ProcessingError;
                }
                if let Err(e) = self.store.put(key, body.clone()).await {
                    tracing::error!(key = %key, size = body.len(), error = %e, "Unable to save content to storage");
                    return Outcome::ProcessingError;
                }
                Outcome::Populated(body)
            }
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => Outcome::Redirect {
                status,
                location: response.headers.get(header::LOCATION).cloned(),
            },
            other => Outcome::PassThrough(other),
        }
    }
}
