//! Bundled player assets.
//!
//! Everything under the asset root is served at `/player/pwa/`. The entry
//! document goes through [`BootstrapInjector`] on every request; unknown
//! sub-routes fall back to it so the player's client-side router can take
//! over.

pub mod guard;
pub mod inject;

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    extract::{OriginalUri, State},
    handler::Handler,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use kiosk_types::ProxyConfig;
use thiserror::Error;
use tower_http::services::ServeDir;

pub use inject::BootstrapInjector;

/// URL prefix the player is built for.
pub const BASE_ROUTE: &str = "/player/pwa";
pub const INDEX_FILE: &str = "index.html";
pub const SERVICE_WORKER_FILE: &str = "sw-pwa.js";

/// Where the player build lives and how it is mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    pub root: PathBuf,
    /// Mount point without trailing slash, e.g. `/player/pwa`
    pub base_route: String,
    pub index_file: String,
    pub service_worker: String,
}

impl AssetConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_route: BASE_ROUTE.to_string(),
            index_file: INDEX_FILE.to_string(),
            service_worker: SERVICE_WORKER_FILE.to_string(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    /// The mount point with its trailing slash, which is also the
    /// service-worker scope.
    pub fn scope(&self) -> String {
        format!("{}/", self.base_route)
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Entry document not found: {}", path.display())]
    IndexMissing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::IndexMissing { path: path.to_path_buf() },
            _ => Self::Read { path: path.to_path_buf(), source },
        }
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::IndexMissing { .. } => StatusCode::NOT_FOUND,
            Self::Read { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(status = status.as_u16(), "{}", self);
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}

#[derive(Clone)]
pub struct AssetState {
    pub config: Arc<AssetConfig>,
    pub injector: Arc<BootstrapInjector>,
}

impl AssetState {
    pub fn new(config: AssetConfig, proxy: &ProxyConfig) -> Self {
        Self { config: Arc::new(config), injector: Arc::new(BootstrapInjector::new(proxy)) }
    }
}

/// Router for the asset mount, to be mounted with `nest_service` at
/// [`AssetConfig::base_route`] so the prefix itself and its trailing-slash
/// form both reach the entry document.
///
/// Layer order: traversal guard, then the service-worker headers, then the
/// file service with the entry document as its fallback.
pub fn asset_router(state: AssetState) -> Router {
    let files = ServeDir::new(&state.config.root)
        .append_index_html_on_directories(false)
        .fallback(serve_index.with_state(state.clone()));

    Router::new()
        .route("/", get(serve_index))
        .route(&format!("/{}", state.config.index_file), get(serve_index))
        .fallback_service(files)
        .layer(middleware::from_fn_with_state(state.clone(), guard::asset_headers))
        .layer(middleware::from_fn(guard::reject_traversal))
        .with_state(state)
}

/// Entry document with the bootstrap script stamped in.
async fn serve_index(
    State(state): State<AssetState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AssetError> {
    if uri.path() == state.config.base_route {
        return Ok(Redirect::permanent(&state.config.scope()).into_response());
    }

    let path = state.config.index_path();
    let document = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| AssetError::from_io(&path, e))?;
    let body = state.injector.inject(&document).into_owned();

    tracing::debug!(
        path = %uri.path(),
        injected = state.injector.is_enabled(),
        "Serving entry document"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}
