//! Transload relay library.
//!
//! Streams a file from an allowlisted HTTP origin straight into a
//! pre-authorized object-storage write.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod transload;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
