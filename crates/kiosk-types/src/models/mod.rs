//! Domain models for the kiosk relay.

mod config;
mod route;

pub use config::{ConfigLayer, ProxyConfig, DEFAULT_DISPLAY_NAME};
pub use route::RouteKind;
