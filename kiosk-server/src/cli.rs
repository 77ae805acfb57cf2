use clap::Parser;
use kiosk_types::ConfigLayer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kiosk-relay",
    about = "Kiosk Relay - serves the signage player and proxies its CMS calls",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(short, long, env = "KIOSK_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    #[arg(long, env = "KIOSK_CMS_URL", help = "CMS base address, e.g. https://cms.example.org")]
    pub cms_url: Option<String>,

    #[arg(long, env = "KIOSK_CMS_KEY", help = "CMS server key")]
    pub cms_key: Option<String>,

    #[arg(long, env = "KIOSK_DISPLAY_NAME", help = "Name the display registers under")]
    pub display_name: Option<String>,

    #[arg(long, env = "KIOSK_DEV", help = "Development mode: verbose logs, ../pwa/dist assets")]
    pub dev: bool,

    #[arg(short, long, env = "KIOSK_CONFIG", help = "JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "KIOSK_PWA_DIR", help = "Root of the player build")]
    pub pwa_dir: Option<PathBuf>,

    #[arg(long, env = "KIOSK_SETTINGS", help = "Settings store written by the desktop shell")]
    pub settings: Option<PathBuf>,

    #[arg(short, long, env = "KIOSK_LOG_LEVEL", help = "Log filter, overrides RUST_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    /// The command line as the newest configuration layer.
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            remote_server_address: self.cms_url.clone(),
            access_key: self.cms_key.clone(),
            display_name: self.display_name.clone(),
            inject_bootstrap: None,
            port: self.port,
            pwa_dir: self.pwa_dir.clone(),
        }
    }

    pub fn log_filter(&self) -> Option<String> {
        self.log_level.clone()
    }

    pub fn default_log_level(&self) -> &'static str {
        if self.dev {
            "debug"
        } else {
            "info"
        }
    }
}
