//! Router composition and the running-server handle.

use std::{future::Future, io, net::SocketAddr, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use kiosk_types::ProxyConfig;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::assets::{asset_router, AssetConfig, AssetState};
use crate::error::AppResult;
use crate::proxy::{build_proxy_router, middleware::cors_layer, ProxyState, UpstreamClient};

/// Largest request body a proxy route accepts.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// How long in-flight requests get to finish once shutdown starts.
pub const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Configuration for composing the server
#[derive(Debug, Clone)]
pub struct ServerStartConfig {
    pub assets: AssetConfig,
    pub proxy: ProxyConfig,
}

/// Compose the full HTTP surface: root redirect, the three proxy routes, the
/// player mount, and a 404 for everything else.
pub fn build_router(config: ServerStartConfig, upstream: UpstreamClient) -> Router {
    let assets = AssetState::new(config.assets, &config.proxy);
    let base_route = assets.config.base_route.clone();
    let scope = assets.config.scope();

    Router::new()
        .route("/", get(move || async move { Redirect::temporary(&scope) }))
        .merge(build_proxy_router(ProxyState { upstream }))
        .nest_service(&base_route, asset_router(assets))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

/// A server running on its own task.
///
/// The embedding shell gets the bound address from [`ServerHandle::local_addr`]
/// and stops the server with [`ServerHandle::shutdown`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Start serving `router` on an already-bound listener.
    pub fn spawn(listener: TcpListener, router: Router) -> AppResult<Self> {
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!(addr = %local_addr, "Kiosk relay listening");
        Ok(Self { local_addr, shutdown_tx: Some(shutdown_tx), task })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, give in-flight requests [`DRAIN_GRACE`] to
    /// finish, then abort whatever is left.
    pub async fn shutdown(mut self) -> AppResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        let mut task = self.task;
        match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
            Ok(joined) => flatten(joined),
            Err(_) => {
                tracing::warn!(
                    grace_secs = DRAIN_GRACE.as_secs(),
                    "In-flight requests did not drain in time, aborting"
                );
                task.abort();
                Ok(())
            },
        }
    }

    /// Serve until `signal` resolves, then shut down gracefully. Returns early
    /// if the server task itself stops.
    pub async fn run_until(mut self, signal: impl Future<Output = ()>) -> AppResult<()> {
        tokio::select! {
            joined = &mut self.task => return flatten(joined),
            () = signal => {},
        }
        self.shutdown().await
    }
}

fn flatten(joined: Result<io::Result<()>, tokio::task::JoinError>) -> AppResult<()> {
    match joined {
        Ok(result) => Ok(result?),
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(io::Error::other(e).into()),
    }
}
