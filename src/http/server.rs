//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single catch-all retrieval route
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Dispatch requests to the cache handler
//! - Drain in-flight requests on shutdown, bounded by the grace period
//! - Sync the store exactly once after draining

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, Uri},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::LifecycleConfig;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response;
use crate::lifecycle::shutdown::sync_store;
use crate::observability::metrics;
use crate::proxy::RequestHandler;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RequestHandler>,
}

/// HTTP server for the cache proxy.
pub struct HttpServer {
    router: Router,
    handler: Arc<RequestHandler>,
    grace_period: Duration,
}

impl HttpServer {
    /// Create a new HTTP server around `handler`.
    pub fn new(handler: RequestHandler, lifecycle: &LifecycleConfig) -> Self {
        let handler = Arc::new(handler);
        let state = AppState {
            handler: handler.clone(),
        };

        Self {
            router: Self::build_router(state),
            handler,
            grace_period: Duration::from_secs(lifecycle.grace_period_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", get(serve_object))
            .route("/", get(serve_object))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            request_id = %request_id(request),
                            method = %request.method(),
                            path = %request.uri().path(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain and sync.
    ///
    /// Once the signal arrives no new connections are accepted. In-flight requests
    /// get up to the grace period to finish; after that they are abandoned and can
    /// no longer write to the store. The store is synced exactly once afterwards,
    /// whatever happened before.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstreams = ?self.handler.pool().names(),
            "HTTP server starting"
        );

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Received stop signal. Draining in-flight requests");
                let _ = draining_tx.send(());
            })
            .into_future();
        tokio::pin!(serve);
        tokio::pin!(draining_rx);

        let served = tokio::select! {
            biased;
            res = &mut serve => res,
            Ok(()) = &mut draining_rx => {
                match tokio::time::timeout(self.grace_period, &mut serve).await {
                    Ok(res) => res,
                    Err(_) => {
                        tracing::warn!(
                            grace_period_secs = self.grace_period.as_secs(),
                            "Grace period elapsed, abandoning in-flight requests"
                        );
                        Ok(())
                    }
                }
            }
        };

        if let Err(e) = &served {
            tracing::error!(error = %e, "Failed to stop HTTP server cleanly");
        }

        // Requests abandoned after the grace period keep running; stop their writes first.
        self.handler.close().await;
        sync_store(self.handler.store().as_ref()).await;

        tracing::info!("HTTP server stopped");
        served
    }
}

/// Catch-all retrieval handler.
async fn serve_object(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start_time = Instant::now();
    let key = uri.path();

    let outcome = state.handler.handle(key).await;
    metrics::record_request(outcome.label(), start_time);

    response::render(outcome, key, headers.get(header::RANGE))
}
