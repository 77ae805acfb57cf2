//! Request guards for the asset mount.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AssetState;

/// Whether a request path tries to leave the asset root.
///
/// Checked on the raw path, before any decoding: `..` segments (plain or
/// percent-encoded), encoded separators, backslashes and NUL bytes.
pub fn is_traversal(path: &str) -> bool {
    path.split('/').any(|segment| {
        let lowered = segment.to_ascii_lowercase();
        lowered.replace("%2e", ".") == ".."
            || lowered.contains("%2f")
            || lowered.contains("%5c")
            || lowered.contains("%00")
            || lowered.contains('\\')
            || lowered.contains('\0')
    })
}

pub async fn reject_traversal(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if is_traversal(path) {
        tracing::warn!(path = %path, "Rejected path traversal attempt");
        return (StatusCode::BAD_REQUEST, "Bad request").into_response();
    }
    next.run(request).await
}

/// Cache-disabling headers on the service-worker script, whatever the method
/// or query string. The browser must always see the latest worker.
pub async fn asset_headers(
    State(state): State<AssetState>,
    request: Request,
    next: Next,
) -> Response {
    let is_worker =
        request.uri().path().rsplit('/').next() == Some(state.config.service_worker.as_str());
    let mut response = next.run(request).await;

    if is_worker {
        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        if let Ok(scope) = HeaderValue::from_str(&state.config.scope()) {
            headers.insert(SERVICE_WORKER_ALLOWED, scope);
        }
    }
    response
}

const SERVICE_WORKER_ALLOWED: header::HeaderName =
    header::HeaderName::from_static("service-worker-allowed");
