//! Proxy route table and the shared relay pipeline.
//!
//! Each route kind only decides two pure things: how an inbound request maps
//! to an [`UpstreamRequest`], and which upstream headers make it back. The
//! network call, body read, logging and error boundary live in [`dispatch`].

mod file;
mod rest;
mod xmds;

pub use file::FileRoute;
pub use rest::RestRoute;
pub use xmds::XmdsRoute;

use axum::{
    body::{Body, Bytes},
    extract::{RawQuery, State},
    http::{header, HeaderMap, Method},
    response::Response,
    routing::{any, get},
    Router,
};
use futures::StreamExt;
use kiosk_types::{ProxyError, RouteKind};

use super::headers::relay_headers;
use super::query::ProxyQuery;
use super::transfer::TransferLog;
use super::upstream::{error_chain, UpstreamClient, UpstreamRequest};

/// State shared by the proxy handlers. Read-only after construction.
#[derive(Clone)]
pub struct ProxyState {
    pub upstream: UpstreamClient,
}

/// An inbound request to one of the proxy routes.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub query: ProxyQuery,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// How the upstream body travels back to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Read fully, then relay. Failures still become a JSON 500.
    Buffered,
    /// Relay chunk by chunk as it arrives.
    Streamed,
}

pub trait ProxyRoute: Send + Sync + 'static {
    const KIND: RouteKind;
    const BODY: BodyMode = BodyMode::Buffered;

    /// Resolve the upstream call. Errors here are client errors and happen
    /// before any network activity.
    fn prepare(&self, inbound: &InboundRequest) -> Result<UpstreamRequest, ProxyError>;

    /// Headers relayed back to the player.
    fn response_headers(&self, upstream: &HeaderMap) -> HeaderMap {
        relay_headers(upstream)
    }
}

pub fn build_proxy_router(state: ProxyState) -> Router {
    Router::new()
        .route(RouteKind::ProcedureCall.mount_path(), any(handle::<XmdsRoute>))
        .route(RouteKind::RestCall.mount_path(), any(handle::<RestRoute>))
        .route(RouteKind::FileDownload.mount_path(), get(handle::<FileRoute>))
        .with_state(state)
}

async fn handle<R: ProxyRoute + Default>(
    State(state): State<ProxyState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let inbound =
        InboundRequest { method, query: ProxyQuery::parse(query.as_deref()), headers, body };
    dispatch(&R::default(), &state.upstream, inbound).await
}

/// Run one proxy call end to end. Never returns an error: every failure is
/// turned into a JSON response for this request alone.
///
/// If the player disconnects, hyper drops this future (or the streamed body),
/// which drops the in-flight upstream request with it.
pub async fn dispatch<R: ProxyRoute>(
    route: &R,
    client: &UpstreamClient,
    inbound: InboundRequest,
) -> Response {
    let request = match route.prepare(&inbound) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(route = %R::KIND, method = %inbound.method, "Rejected: {}", e);
            return super::error_response(&e);
        },
    };

    if let Some(range) = request.headers.get(header::RANGE) {
        tracing::info!(route = %R::KIND, url = %request.url, range = ?range, "Range request");
    }

    let mut transfer = TransferLog::start(R::KIND, &request.method, &request.url);

    let upstream = match client.send(request).await {
        Ok(response) => response,
        Err(e) => return fail(&mut transfer, R::KIND, &e),
    };

    let status = upstream.status();
    transfer.record_status(status);
    let headers = route.response_headers(upstream.headers());

    let body = match R::BODY {
        BodyMode::Buffered => match upstream.bytes().await {
            Ok(bytes) => {
                transfer.add_bytes(bytes.len());
                transfer.complete();
                Body::from(bytes)
            },
            Err(e) => return fail(&mut transfer, R::KIND, &e),
        },
        BodyMode::Streamed => streamed_body(upstream, transfer),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn fail(transfer: &mut TransferLog, route: RouteKind, err: &reqwest::Error) -> Response {
    let message = error_chain(err);
    transfer.fail(message.clone());
    super::error_response(&ProxyError::upstream(route, message))
}

fn streamed_body(upstream: reqwest::Response, mut transfer: TransferLog) -> Body {
    let stream = async_stream::stream! {
        let mut chunks = upstream.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    transfer.add_bytes(bytes.len());
                    yield Ok(bytes);
                },
                Err(e) => {
                    transfer.fail(error_chain(&e));
                    yield Err(e);
                    break;
                },
            }
        }
        transfer.complete();
    };
    Body::from_stream(stream)
}
