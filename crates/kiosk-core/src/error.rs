//! Unified error types for Kiosk Core.

use kiosk_types::{ConfigError, ProxyError};
use thiserror::Error;

/// Main error type for startup and composition failures.
///
/// Per-request failures never surface here; the proxy routes turn them into
/// responses themselves.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client construction failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system or socket I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Proxy operation failed.
    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),
}

/// Result type alias for Kiosk Core operations.
pub type AppResult<T> = Result<T, AppError>;
