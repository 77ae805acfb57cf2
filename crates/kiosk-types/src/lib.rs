//! # Kiosk Types
//!
//! Configuration models and error definitions shared by the kiosk relay crates.
//!
//! - **`error`** - Typed errors for proxy routes and configuration loading
//! - **`models`** - `ProxyConfig`, its layered sources, and the proxy route kinds
//!
//! ## Architecture Role
//!
//! ```text
//!     kiosk-types (this crate)
//!            │
//!            ▼
//!       kiosk-core  (assets, injector, proxy routes, server)
//!            │
//!            ▼
//!      kiosk-server (CLI binary)
//! ```
//!
//! Everything here is plain data: serializable, `Clone`, comparable in tests.

pub mod error;
pub mod models;

pub use error::{ConfigError, ProxyError};
pub use models::{ConfigLayer, ProxyConfig, RouteKind};
