//! Startup configuration.
//!
//! Three sources are layered, oldest first: the settings store the desktop
//! shell persists, an optional JSON config file, then the command line. The
//! result is resolved once and never changes for the life of the server.

use std::fs;
use std::path::{Path, PathBuf};

use kiosk_types::{ConfigError, ConfigLayer, ProxyConfig};
use validator::Validate;

pub const DEFAULT_PORT: u16 = 8765;

const APP_DIR: &str = "kiosk-relay";
const SETTINGS_FILE: &str = "settings.json";
const DEV_PWA_DIR: &str = "../pwa/dist";
const BUNDLED_PWA_DIR: &str = "./resources/pwa";

/// `<config dir>/kiosk-relay/settings.json`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Read, parse and validate one JSON layer.
pub fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(path, &e))?;
    let layer: ConfigLayer =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;
    layer.validate().map_err(|e| ConfigError::ValidationError {
        field: e.field_errors().keys().next().map(|k| k.to_string()).unwrap_or_default(),
        message: e.to_string(),
    })?;
    Ok(layer)
}

/// Load an explicitly requested config file. Any failure is fatal to the caller.
pub fn load_config_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let layer = read_layer(path)?;
    tracing::info!(path = %path.display(), "Loaded config file");
    Ok(layer)
}

/// Load the settings store. We only ever read it, and a missing or broken
/// store must not keep the kiosk from starting, so failures degrade to an
/// empty layer.
pub fn load_persisted(path: Option<&Path>) -> ConfigLayer {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_settings_path) else {
        tracing::debug!("No config directory on this platform; skipping settings store");
        return ConfigLayer::default();
    };

    match read_layer(&path) {
        Ok(layer) => {
            tracing::debug!(path = %path.display(), "Loaded persisted settings");
            layer
        },
        Err(ConfigError::NotFound { .. }) => {
            tracing::debug!(path = %path.display(), "No persisted settings");
            ConfigLayer::default()
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring persisted settings: {}", e);
            ConfigLayer::default()
        },
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub port: u16,
    pub pwa_dir: PathBuf,
    pub proxy: ProxyConfig,
    pub dev: bool,
}

impl StartupConfig {
    pub fn resolve(persisted: &ConfigLayer, file: &ConfigLayer, cli: &ConfigLayer, dev: bool) -> Self {
        let proxy = ProxyConfig::layered([persisted, file, cli]);

        let port = cli.port.or(file.port).or(persisted.port).unwrap_or(DEFAULT_PORT);

        // The settings store never carries an asset root.
        let pwa_dir = cli.pwa_dir.clone().or_else(|| file.pwa_dir.clone()).unwrap_or_else(|| {
            PathBuf::from(if dev { DEV_PWA_DIR } else { BUNDLED_PWA_DIR })
        });

        Self { port, pwa_dir, proxy, dev }
    }

    /// URL a browser in kiosk mode should open.
    pub fn kiosk_url(&self) -> String {
        format!("http://localhost:{}/player/pwa/", self.port)
    }
}
