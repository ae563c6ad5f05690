//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cache_proxy_requests_total` (counter): requests by outcome (hit, miss, redirect, ...)
//! - `cache_proxy_request_duration_seconds` (histogram): latency by outcome
//! - `cache_proxy_upstream_requests_total` (counter): origin fetches by upstream and status
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install metrics recorder: {}", e))?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished client request.
pub fn record_request(outcome: &'static str, start: Instant) {
    counter!("cache_proxy_requests_total", "outcome" => outcome).increment(1);
    histogram!("cache_proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one origin fetch. `status` is "error" for transport failures.
pub fn record_upstream(upstream: &str, status: &str) {
    counter!(
        "cache_proxy_upstream_requests_total",
        "upstream" => upstream.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
