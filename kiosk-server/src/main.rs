//! Kiosk Relay - Standalone Server
//!
//! A loopback HTTP server that:
//! - Serves the bundled signage player at /player/pwa/ with its CMS settings
//!   stamped into the entry page
//! - Relays the player's CMS calls on /xmds-proxy, /rest-proxy, /file-proxy
//!
//! Point a kiosk-mode browser at http://localhost:8765/player/pwa/

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod server_utils;

use cli::Cli;
use kiosk_core::assets::AssetConfig;
use kiosk_core::modules::config::{load_config_file, load_persisted, StartupConfig};
use kiosk_core::proxy::{build_http_client, UpstreamClient};
use kiosk_core::{build_router, ServerHandle, ServerStartConfig};
use kiosk_types::ConfigLayer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.log_filter() {
        Some(directives) => EnvFilter::try_new(directives).context("Invalid --log-level")?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level())),
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let persisted = load_persisted(cli.settings.as_deref());
    let file = match cli.config.as_deref() {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ConfigLayer::default(),
    };
    let startup = StartupConfig::resolve(&persisted, &file, &cli.layer(), cli.dev);

    info!("🚀 Kiosk Relay v{} starting on port {}...", env!("CARGO_PKG_VERSION"), startup.port);
    if startup.proxy.remote_server_address.is_empty() {
        info!("No CMS address configured; the player will ask for one");
    } else {
        info!(
            cms = %startup.proxy.remote_server_address,
            display = %startup.proxy.display_name,
            "CMS configured"
        );
    }
    if !startup.pwa_dir.join("index.html").is_file() {
        tracing::warn!(dir = %startup.pwa_dir.display(), "Player build not found");
    }

    let listener = server_utils::create_listener(startup.port).await?;

    let client = build_http_client().context("Failed to build HTTP client")?;
    let config = ServerStartConfig {
        assets: AssetConfig::new(startup.pwa_dir.clone()),
        proxy: startup.proxy.clone(),
    };
    let router = build_router(config, UpstreamClient::new(client));

    let handle = ServerHandle::spawn(listener, router)?;

    info!("🌐 Player available at {}", startup.kiosk_url());
    info!(
        "🔀 Proxy endpoints at http://localhost:{}/{{xmds,rest,file}}-proxy",
        handle.local_addr().port()
    );
    println!("Open in kiosk mode: {}", startup.kiosk_url());

    handle.run_until(server_utils::shutdown_signal()).await?;

    info!("👋 Kiosk Relay stopped");
    Ok(())
}
