#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use kiosk_core::assets::AssetConfig;
use kiosk_core::proxy::{build_http_client, UpstreamClient};
use kiosk_core::{build_router, ProxyConfig, ServerStartConfig};
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Player</title>\n<script type=\"module\" src=\"/player/pwa/assets/app.js\"></script>\n</head>\n<body><div id=\"app\"></div></body>\n</html>\n";
pub const APP_JS: &str = "console.log('player');\n";
pub const SERVICE_WORKER_JS: &str = "self.addEventListener('fetch', () => {});\n";

/// Player build with an entry document, one bundled script and the worker.
pub fn player_bundle() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).expect("write index");
    std::fs::write(dir.path().join("sw-pwa.js"), SERVICE_WORKER_JS).expect("write worker");
    std::fs::create_dir(dir.path().join("assets")).expect("mkdir assets");
    std::fs::write(dir.path().join("assets/app.js"), APP_JS).expect("write app");
    dir
}

pub fn configured(address: &str) -> ProxyConfig {
    ProxyConfig {
        remote_server_address: address.to_string(),
        access_key: "ABC123".to_string(),
        display_name: "Lobby Screen".to_string(),
        inject_bootstrap: true,
    }
}

pub fn app(root: &Path, proxy: ProxyConfig) -> Router {
    let client = build_http_client().expect("http client");
    build_router(
        ServerStartConfig { assets: AssetConfig::new(root), proxy },
        UpstreamClient::new(client),
    )
}

/// Router with an empty asset root, for proxy-only tests.
pub fn proxy_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = app(dir.path(), ProxyConfig::default());
    (dir, router)
}

/// Percent-encode a value for use in a query string.
pub fn enc(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub struct Relayed {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Relayed {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

pub async fn send(router: Router, request: Request<Body>) -> Relayed {
    let response = router.oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    Relayed { status, headers, body }
}
