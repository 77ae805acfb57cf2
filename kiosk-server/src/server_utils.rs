use listenfd::ListenFd;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub enum ListenError {
    #[error("Port {port} is already in use. Try --port=XXXX or stop the other process.")]
    PortInUse { port: u16 },

    #[error("Failed to listen on 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Socket activation failed: {0}")]
    Activation(#[source] io::Error),
}

/// Bind the loopback listener.
///
/// A busy port is fatal: the shell and the player both expect the configured
/// port, so no other one is tried.
pub async fn create_listener(port: u16) -> Result<tokio::net::TcpListener, ListenError> {
    let mut listenfd = ListenFd::from_env();

    if let Some(listener) = listenfd.take_tcp_listener(0).map_err(ListenError::Activation)? {
        info!("🔌 Using systemd socket activation (fd=3)");
        listener.set_nonblocking(true).map_err(ListenError::Activation)?;
        return tokio::net::TcpListener::from_std(listener).map_err(ListenError::Activation);
    }

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let bind_error = |source: io::Error| match source.kind() {
        io::ErrorKind::AddrInUse => ListenError::PortInUse { port },
        _ => ListenError::Bind { port, source },
    };

    let socket =
        Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(bind_error)?;
    // Lets a restart rebind over TIME_WAIT. Windows semantics would allow
    // stealing a live port, so it stays unix-only.
    #[cfg(unix)]
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.set_nonblocking(true).map_err(bind_error)?;
    socket.bind(&addr.into()).map_err(bind_error)?;
    socket.listen(1024).map_err(bind_error)?;

    info!("🔌 Bound to {}", addr);

    tokio::net::TcpListener::from_std(socket.into()).map_err(bind_error)
}

#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("🛑 Received Ctrl+C, shutting down..."),
        () = terminate => info!("🛑 Received SIGTERM, shutting down..."),
    }

    info!("⏳ Draining in-flight requests...");
}
