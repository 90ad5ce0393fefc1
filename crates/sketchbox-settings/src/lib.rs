//! Sketchbox Settings Crate
//!
//! Persisted application configuration in JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    Config, OfflineSettings, RenderSettings, WatchSettings, WindowSettings, APP_DIR, CONFIG_FILE,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
