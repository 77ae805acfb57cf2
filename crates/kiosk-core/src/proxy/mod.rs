//! Proxy module - CMS relay routes
//!
//! The player never talks to the CMS directly. Every call goes through one of
//! three loopback routes, each carrying the CMS base address in its `cms`
//! query parameter:
//!
//! - `/xmds-proxy`: SOAP/XML procedure calls, relayed to `{cms}/xmds.php`
//! - `/rest-proxy`: REST calls, relayed to `{cms}{path}`
//! - `/file-proxy`: media downloads, relayed to `{cms}{url}` with `Range`
//!
//! Responses are stamped with `Access-Control-Allow-Origin: *` and stripped of
//! transport headers the extra hop invalidates.

pub mod headers;
pub mod middleware;
pub mod query;
pub mod routes;
pub mod transfer;
pub mod upstream;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kiosk_types::ProxyError;

pub use query::ProxyQuery;
pub use routes::{build_proxy_router, ProxyState};
pub use upstream::{build_http_client, UpstreamClient, UpstreamRequest, USER_AGENT};

/// Render a [`ProxyError`] as the JSON error response the player expects.
pub fn error_response(error: &ProxyError) -> Response {
    let status =
        StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(error.error_body())).into_response()
}
