//! Origin server client.
//!
//! # Responsibilities
//! - Join the endpoint base URL with the request path
//! - Issue a single GET without following redirects
//! - Keep a bounded pool of idle keepalive connections per endpoint
//! - Separate transport failures from non-200 responses
//!
//! # Design Decisions
//! - One `reqwest::Client` per endpoint so keepalive limits apply per origin
//! - Body reading is deferred; callers only read it for a 200
//! - Environment proxies are ignored, origins are dialed directly
//! - `keepalive` caps idle connections only; reqwest has no cap on total
//!   connections per host, so busy origins may see more than `keepalive`

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, StatusCode};
use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt};
use url::Url;

use crate::config::UpstreamConfig;

/// Error type for origin requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The configured base URL is unusable.
    #[error("invalid upstream url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    Client(String),
    /// No response was obtained (DNS, connect, TLS, timeout).
    #[error("upstream transport error: {0}")]
    Transport(String),
    /// A response arrived but its body could not be read.
    #[error("failed to read upstream body: {0}")]
    Body(String),
}

/// Response headers and status from an origin, with the body not yet read.
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: BoxFuture<'static, Result<Bytes, FetchError>>,
}

impl OriginResponse {
    pub fn new<F>(status: StatusCode, headers: HeaderMap, body: F) -> Self
    where
        F: Future<Output = Result<Bytes, FetchError>> + Send + 'static,
    {
        Self {
            status,
            headers,
            body: body.boxed(),
        }
    }

    /// The `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Read the full body.
    pub async fn bytes(self) -> Result<Bytes, FetchError> {
        self.body.await
    }
}

impl fmt::Debug for OriginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Something that can serve a resource path.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Label used in logs and metrics.
    fn name(&self) -> &str;

    /// Issue one retrieval request for `path`.
    async fn fetch(&self, path: &str) -> Result<OriginResponse, FetchError>;
}

/// A single origin endpoint with its own connection pool.
#[derive(Debug, Clone)]
pub struct OriginClient {
    base_url: String,
    client: reqwest::Client,
}

impl OriginClient {
    /// Build a client for `base_url` using the pool settings in `config`.
    pub fn new(base_url: &str, config: &UpstreamConfig) -> Result<Self, FetchError> {
        let parsed = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(config.keepalive)
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .no_proxy();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(error_chain(&e)))?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path`, with exactly one slash at the join point.
    pub fn target_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl Origin for OriginClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, path: &str) -> Result<OriginResponse, FetchError> {
        let url = self.target_url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = async move {
            response
                .bytes()
                .await
                .map_err(|e| FetchError::Body(error_chain(&e)))
        };
        Ok(OriginResponse::new(status, headers, body))
    }
}

/// Join a base URL and a request path.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// reqwest's Display hides the underlying cause; include the whole chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
