// CORS middleware
use std::time::Duration;

use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::proxy::headers::SOAP_ACTION;

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Preflight answers for the player's page scripts.
///
/// The player is served from this same origin, but the shell may also load it
/// from a file URL or a dev server, so any origin is accepted. No credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            X_REQUESTED_WITH,
            SOAP_ACTION,
            header::ACCEPT,
            header::IF_NONE_MATCH,
            header::RANGE,
        ])
        .expose_headers([header::CONTENT_RANGE, header::ACCEPT_RANGES, header::ETAG])
        .allow_credentials(false)
        .max_age(Duration::from_secs(86_400))
}
