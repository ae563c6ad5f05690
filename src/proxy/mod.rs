//! Cache-aside proxy core.
//!
//! # Data Flow
//! ```text
//! GET /path/to/object.ext
//!     → extension.rs (allowed? otherwise Rejected)
//!     → handler.rs
//!         store hit       → Hit
//!         miss            → pool.next().fetch(path)
//!             200         → put → Populated | ProcessingError
//!             301/302     → Redirect
//!             other       → PassThrough
//!             no response → TransportError
//!     → http/response.rs (Outcome → HTTP response)
//! ```

pub mod extension;
pub mod handler;

pub use extension::AllowedExtensions;
pub use handler::{Outcome, RequestHandler};
