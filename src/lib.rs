//! # Sketchbox
//!
//! A live-coding sandbox for 2D vector graphics. A sketch is a Rhai script
//! that declares parameters once and then draws with a Cairo context on
//! every frame; edits on disk are picked up while it runs.
//!
//! ## Architecture
//!
//! 1. **sketchbox-core** - Geometry, colors, units, pointer drag state
//! 2. **sketchbox-params** - Parameter kinds, values and value sources
//! 3. **sketchbox-script** - Script engine, drawing API, frame pipeline, watcher
//! 4. **sketchbox-settings** - Configuration file
//! 5. **sketchbox-offline** - Headless rendering to PNG, PDF, PostScript, SVG
//! 6. **sketchbox-ui** - GTK4 render and parameter windows
//! 7. **sketchbox** - The `sketchbox` and `sketchbox-offline` binaries

use std::path::Path;

use anyhow::Context;

pub use sketchbox_offline as offline;
pub use sketchbox_script::{RenderOptions, Script};
pub use sketchbox_settings::{Config, RenderSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Render options for the engine from the configured render settings.
pub fn render_options(settings: &RenderSettings) -> RenderOptions {
    RenderOptions {
        error_overlay: settings.error_overlay,
        error_line_advance: settings.error_line_advance,
        crosshair_size: settings.crosshair_size,
        debug_line_width: settings.debug_line_width,
    }
}

/// Loads `path`, or the platform config file when none is given. A missing
/// file yields the defaults; a malformed one is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match Config::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                return Ok(Config::default());
            }
        },
    };
    let config = Config::load_or_default(&path)
        .with_context(|| format!("cannot load configuration from {}", path.display()))?;
    Ok(config)
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty output on stderr, leaving stdout free for streamed documents
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_follow_settings() {
        let mut settings = RenderSettings::default();
        settings.error_overlay = false;
        settings.crosshair_size = 4.0;
        let options = render_options(&settings);
        assert!(!options.error_overlay);
        assert_eq!(options.crosshair_size, 4.0);
        assert_eq!(options.debug_line_width, settings.debug_line_width);
    }

    #[test]
    fn test_load_config_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\ntick_interval_ms = 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
