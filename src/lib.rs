//! Caching reverse proxy for static media assets.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod store;
pub mod upstream;

pub use config::CacheProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
