//! Typed error definitions.
//!
//! Errors are serializable so they can be rendered straight into JSON response
//! bodies, and matchable so callers can pick the HTTP status.

mod config;
mod proxy;

pub use config::ConfigError;
pub use proxy::ProxyError;
