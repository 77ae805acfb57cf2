//! # Kiosk Core
//!
//! The proxy-and-config layer of the kiosk player wrapper.
//!
//! ```text
//! kiosk-core/src/
//! ├── assets/           # bundled player: static files, SPA fallback, bootstrap injection
//! ├── proxy/            # /xmds-proxy, /rest-proxy, /file-proxy relays to the CMS
//! ├── modules/config.rs # layered startup configuration
//! └── server.rs         # router composition and the running-server handle
//! ```
//!
//! The shell that embeds the player hands us a port and an asset root; we hand
//! back the bound address and a shutdown hook. Nothing here mutates shared
//! state once the router is built.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod assets;
pub mod error;
pub mod modules;
pub mod proxy;
pub mod server;

pub use error::{AppError, AppResult};
pub use kiosk_types::{ConfigLayer, ProxyConfig, ProxyError, RouteKind};
pub use server::{build_router, ServerHandle, ServerStartConfig};
