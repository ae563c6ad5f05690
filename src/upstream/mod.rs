//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Cache miss
//!     → pool.rs (pick next origin)
//!         - round_robin.rs (atomic cursor modulo pool size)
//!     → origin.rs (GET base_url + path, redirects not followed)
//!     → OriginResponse (status, headers, lazily read body) or FetchError
//! ```
//!
//! # Design Decisions
//! - Uniform round robin only; no health checks, weights or retries
//! - The cursor is owned by the pool instance, not global
//! - Connection pooling per origin for efficiency

pub mod origin;
pub mod pool;
pub mod round_robin;

pub use origin::{FetchError, Origin, OriginClient, OriginResponse};
pub use pool::{PoolError, UpstreamPool};
