//! Header transformation for the proxy hop.
//!
//! Pure functions from one header map to another. Nothing is mutated in place
//! on a live request or response.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Transport-level headers invalidated by the extra hop.
pub const RELAY_BLOCKLIST: [HeaderName; 4] = [
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
];

/// Inbound headers the REST proxy passes on to the CMS.
pub const REST_FORWARD_ALLOWLIST: [HeaderName; 4] =
    [header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT, header::IF_NONE_MATCH];

pub const SOAP_ACTION: HeaderName = HeaderName::from_static("soapaction");

/// Upstream response headers minus [`RELAY_BLOCKLIST`], CORS stamp applied last.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.len() + 1);
    for (name, value) in upstream {
        if !RELAY_BLOCKLIST.contains(name) {
            relayed.append(name.clone(), value.clone());
        }
    }
    stamp_cors(relayed)
}

/// Copy every value of the allowlisted headers, nothing else.
pub fn forward_headers(inbound: &HeaderMap, allowlist: &[HeaderName]) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(allowlist.len());
    for name in allowlist {
        for value in inbound.get_all(name) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

/// Replace any upstream `Access-Control-Allow-Origin` with `*`.
pub fn stamp_cors(mut headers: HeaderMap) -> HeaderMap {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}
