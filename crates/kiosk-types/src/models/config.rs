//! Proxy configuration and the layers it is assembled from.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Display name used when no layer provides one.
pub const DEFAULT_DISPLAY_NAME: &str = "Kiosk Player";

/// Bootstrap configuration handed to the served player.
///
/// Built once at startup from [`ConfigLayer`]s and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// CMS base address, e.g. `https://cms.example.org`
    #[serde(default)]
    pub remote_server_address: String,
    /// CMS server key
    #[serde(default)]
    pub access_key: String,
    /// Name the display registers under
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Stamp bootstrap config into the entry document
    #[serde(default = "default_inject_bootstrap")]
    pub inject_bootstrap: bool,
}

fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

const fn default_inject_bootstrap() -> bool {
    true
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            remote_server_address: String::new(),
            access_key: String::new(),
            display_name: default_display_name(),
            inject_bootstrap: default_inject_bootstrap(),
        }
    }
}

impl ProxyConfig {
    /// Fold layers oldest-first: persisted store, config file, command line.
    pub fn layered<'a>(layers: impl IntoIterator<Item = &'a ConfigLayer>) -> Self {
        let mut config = Self::default();
        for layer in layers {
            config.apply(layer);
        }
        config
    }

    /// Apply one newer layer on top of this config.
    ///
    /// Blank strings never replace a populated value, so a stale empty field
    /// cannot erase an address an operator set elsewhere.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(address) = non_blank(layer.remote_server_address.as_deref()) {
            self.remote_server_address = address.to_string();
        }
        if let Some(key) = non_blank(layer.access_key.as_deref()) {
            self.access_key = key.to_string();
        }
        if let Some(name) = non_blank(layer.display_name.as_deref()) {
            self.display_name = name.to_string();
        }
        if let Some(inject) = layer.inject_bootstrap {
            self.inject_bootstrap = inject;
        }
    }

    /// Whether the entry document should carry the bootstrap script.
    pub fn should_inject(&self) -> bool {
        self.inject_bootstrap && !self.remote_server_address.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One source of configuration: the persisted settings store, a JSON config
/// file, or the command line. Unset fields leave older layers untouched.
///
/// Legacy key names from the settings store (`cmsUrl`, `cmsAddress`, `cmsKey`,
/// `serverPort`) are accepted; unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    #[serde(default, alias = "cmsUrl", alias = "cmsAddress")]
    pub remote_server_address: Option<String>,
    #[serde(default, alias = "cmsKey")]
    pub access_key: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub inject_bootstrap: Option<bool>,
    /// Listening port
    #[serde(default, alias = "serverPort")]
    #[validate(range(min = 1_u16))]
    pub port: Option<u16>,
    /// Root of the bundled player build
    #[serde(default)]
    pub pwa_dir: Option<PathBuf>,
}
