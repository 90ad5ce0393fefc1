//! Configuration for Sketchbox
//!
//! Supports JSON and TOML files, chosen by extension, stored in the
//! platform config directory. Sections:
//! - Render settings (redraw tick, drag threshold, diagnostic overlays)
//! - Parameter window size
//! - Headless defaults
//! - File watching

use serde::{Deserialize, Serialize};
use sketchbox_core::DEFAULT_DRAG_THRESHOLD;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "sketchbox";
pub const CONFIG_FILE: &str = "config.toml";

/// Render loop and diagnostic overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Redraw interval in milliseconds
    pub tick_interval_ms: u64,
    /// Pointer travel, in pixels, below which a press and release is a click
    pub drag_threshold: f64,
    /// Draw script errors over the render surface
    pub error_overlay: bool,
    /// Line spacing of the error text, in device units
    pub error_line_advance: f64,
    /// Half the arm length of the current-point marker, in device pixels
    pub crosshair_size: f64,
    /// Debug stroke width, in millimeters
    pub debug_line_width: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 25,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            error_overlay: true,
            error_line_advance: 10.0,
            crosshair_size: 5.0,
            debug_line_width: 0.1,
        }
    }
}

/// Parameter window size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub panel_width: u32,
    pub panel_height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            panel_width: 420,
            panel_height: 640,
        }
    }
}

/// Headless runner defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineSettings {
    /// Raster resolution used when `--dpi` is not given
    pub dpi: f64,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self { dpi: 96.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Reload the script when it changes on disk
    pub auto_reload: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { auto_reload: true }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub render: RenderSettings,
    pub window: WindowSettings,
    pub offline: OfflineSettings,
    pub watch: WatchSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("(none)").to_string(),
        )),
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(key, value))
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/sketchbox/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| SettingsError::ConfigDirectory("no config directory".to_string()))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads the file at `path`, or the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.render.tick_interval_ms == 0 {
            return Err(out_of_range("render.tick_interval_ms", 0));
        }
        if !(self.render.drag_threshold.is_finite() && self.render.drag_threshold >= 0.0) {
            return Err(out_of_range("render.drag_threshold", self.render.drag_threshold));
        }
        positive("render.error_line_advance", self.render.error_line_advance)?;
        positive("render.crosshair_size", self.render.crosshair_size)?;
        positive("render.debug_line_width", self.render.debug_line_width)?;

        if self.window.panel_width == 0 {
            return Err(out_of_range("window.panel_width", 0));
        }
        if self.window.panel_height == 0 {
            return Err(out_of_range("window.panel_height", 0));
        }

        positive("offline.dpi", self.offline.dpi)?;
        Ok(())
    }
}
