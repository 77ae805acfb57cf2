//! Media download proxy (`/file-proxy`), range-capable.

use axum::http::{header, HeaderMap, HeaderValue, Method};
use kiosk_types::{ProxyError, RouteKind};

use super::{BodyMode, InboundRequest, ProxyRoute};
use crate::proxy::upstream::UpstreamRequest;

#[derive(Debug, Default, Clone, Copy)]
pub struct FileRoute;

impl ProxyRoute for FileRoute {
    const KIND: RouteKind = RouteKind::FileDownload;
    const BODY: BodyMode = BodyMode::Streamed;

    fn prepare(&self, inbound: &InboundRequest) -> Result<UpstreamRequest, ProxyError> {
        let (Some(cms), Some(file)) = (inbound.query.get("cms"), inbound.query.get("url")) else {
            return Err(ProxyError::missing("Missing cms or url parameter"));
        };

        let mut headers = HeaderMap::new();
        if let Some(range) = inbound.headers.get(header::RANGE) {
            headers.insert(header::RANGE, range.clone());
        }
        // Byte ranges must address the stored file, not a compressed rendition.
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));

        let method = if inbound.method == Method::HEAD { Method::HEAD } else { Method::GET };

        Ok(UpstreamRequest { method, url: format!("{cms}{file}"), headers, body: None })
    }
}
