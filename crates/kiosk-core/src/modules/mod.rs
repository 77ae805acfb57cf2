pub mod config;

pub use config::{load_config_file, load_persisted, StartupConfig, DEFAULT_PORT};
