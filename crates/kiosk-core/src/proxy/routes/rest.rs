//! REST API proxy (`/rest-proxy`).

use axum::http::{HeaderMap, Method};
use kiosk_types::{ProxyError, RouteKind};

use super::{InboundRequest, ProxyRoute};
use crate::proxy::headers::{forward_headers, REST_FORWARD_ALLOWLIST};
use crate::proxy::query::build_target;
use crate::proxy::upstream::UpstreamRequest;

#[derive(Debug, Default, Clone, Copy)]
pub struct RestRoute;

impl ProxyRoute for RestRoute {
    const KIND: RouteKind = RouteKind::RestCall;

    fn prepare(&self, inbound: &InboundRequest) -> Result<UpstreamRequest, ProxyError> {
        let cms = inbound.query.require("cms", "Missing cms parameter")?;
        let path = inbound.query.get("path").unwrap_or_default();
        let url = build_target(cms, path, &inbound.query.passthrough(&["cms", "path"]));

        let headers: HeaderMap = forward_headers(&inbound.headers, &REST_FORWARD_ALLOWLIST);

        // Bodies go out as the exact bytes received, whatever their type.
        let carries_body = inbound.method != Method::GET && inbound.method != Method::HEAD;
        let body = (carries_body && !inbound.body.is_empty()).then(|| inbound.body.clone());

        Ok(UpstreamRequest { method: inbound.method.clone(), url, headers, body })
    }
}
