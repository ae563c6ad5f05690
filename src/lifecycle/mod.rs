//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Validate → Open store → Build pool → Build handler
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → Trigger graceful shutdown
//!
//! Shutdown (shutdown.rs + http/server.rs):
//!     Signal received → Stop accepting → Drain (bounded) → Sync store → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then listeners
//! - Shutdown has timeout: in-flight requests are abandoned after the grace period
//! - Store sync runs exactly once and its failure does not block exit

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
