use axum::http::{HeaderMap, Method};
use bytes::Bytes;

/// Identifying `User-Agent` sent on every upstream call.
pub const USER_AGENT: &str = concat!("Kiosk Player Relay/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all proxy routes.
///
/// No request timeout is set: a hung CMS holds its proxy request open until
/// the player gives up and disconnects.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).tcp_nodelay(true).build()
}

/// A fully resolved call to the CMS.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

#[derive(Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
}

impl UpstreamClient {
    /// Accepts a pre-built `reqwest::Client` so tests and the binary share
    /// one construction path.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    pub async fn send(&self, request: UpstreamRequest) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder =
            self.http_client.request(request.method, request.url.as_str()).headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder.send().await
    }
}

/// Flatten an error and its sources into one line for logs and error bodies.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
