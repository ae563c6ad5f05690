//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, single catch-all GET route)
//!     → request.rs (request ID for the trace span)
//!     → [cache handler classifies the request]
//!     → response.rs (Outcome → status, headers, body)
//!     → range.rs (optional single byte range of the object)
//!     → Send to client
//! ```

pub mod range;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::X_CACHE_STATUS;
pub use server::HttpServer;
