//! SOAP/XML procedure proxy (`/xmds-proxy`).

use axum::http::{header, HeaderMap, HeaderValue, Method};
use kiosk_types::{ProxyError, RouteKind};

use super::{InboundRequest, ProxyRoute};
use crate::proxy::headers::{forward_headers, stamp_cors, SOAP_ACTION};
use crate::proxy::query::build_target;
use crate::proxy::upstream::UpstreamRequest;

const XMDS_ENDPOINT: &str = "/xmds.php";
const DEFAULT_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

#[derive(Debug, Default, Clone, Copy)]
pub struct XmdsRoute;

impl ProxyRoute for XmdsRoute {
    const KIND: RouteKind = RouteKind::ProcedureCall;

    fn prepare(&self, inbound: &InboundRequest) -> Result<UpstreamRequest, ProxyError> {
        let cms = inbound.query.require("cms", "Missing cms parameter")?;
        let url = build_target(cms, XMDS_ENDPOINT, &inbound.query.passthrough(&["cms"]));

        let mut headers = HeaderMap::new();
        let content_type = inbound
            .headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        headers.insert(header::CONTENT_TYPE, content_type);
        if let Some(action) = inbound.headers.get(&SOAP_ACTION) {
            headers.insert(SOAP_ACTION, action.clone());
        }

        let carries_body = inbound.method != Method::GET && inbound.method != Method::HEAD;
        let body = (carries_body && !inbound.body.is_empty()).then(|| inbound.body.clone());

        Ok(UpstreamRequest { method: inbound.method.clone(), url, headers, body })
    }

    /// Only the content type survives; status and body are relayed untouched.
    fn response_headers(&self, upstream: &HeaderMap) -> HeaderMap {
        stamp_cors(forward_headers(upstream, &[header::CONTENT_TYPE]))
    }
}
