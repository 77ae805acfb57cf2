//! Proxy-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RouteKind;

/// Errors produced by the proxy routes.
///
/// Every variant is contained within the request that produced it: the route
/// turns it into a JSON response and the server keeps serving.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProxyError {
    /// A required query parameter was absent; no upstream call was made
    #[error("{message}")]
    MissingParameter {
        /// Operator-facing message, e.g. "Missing cms parameter"
        message: String,
    },

    /// The upstream call failed (DNS, connect, TLS, invalid target, body read)
    #[error("{route} upstream request failed: {message}")]
    Upstream {
        /// Route that issued the call
        route: RouteKind,
        /// Underlying failure message
        message: String,
    },
}

impl ProxyError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingParameter { message: message.into() }
    }

    pub fn upstream(route: RouteKind, message: impl Into<String>) -> Self {
        Self::Upstream { route, message: message.into() }
    }

    /// Check if this is a client error (4xx equivalent).
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingParameter { .. })
    }

    /// Get HTTP status code for this error.
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingParameter { .. } => 400,
            Self::Upstream { .. } => 500,
        }
    }

    /// JSON body sent back to the caller: `{error}` for client errors,
    /// `{error, message}` for upstream failures.
    pub fn error_body(&self) -> serde_json::Value {
        match self {
            Self::MissingParameter { message } => serde_json::json!({ "error": message }),
            Self::Upstream { route, message } => serde_json::json!({
                "error": route.error_code(),
                "message": message,
            }),
        }
    }
}
