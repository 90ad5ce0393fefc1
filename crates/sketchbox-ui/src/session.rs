//! Toolkit-independent state behind the two windows.
//!
//! A [`Session`] owns the script, the widget value store, the latest
//! streamed input and the file watcher. GTK callbacks only translate
//! events into calls on it, so everything here runs without a display.

use std::path::{Path, PathBuf};

use sketchbox_core::Point;
use sketchbox_params::LiveValues;
use sketchbox_script::{
    Frame, RenderError, RenderOptions, Script, ScriptWatcher, SharedInput, Viewport,
};
use tracing::{info, warn};

pub struct Session {
    script: Script,
    live: LiveValues,
    input: SharedInput,
    watcher: Option<ScriptWatcher>,
}

impl Session {
    /// Loads the script at `path`. Load failures are kept on the script and
    /// shown on the canvas; they do not prevent the session from opening.
    pub fn open(path: impl Into<PathBuf>, options: RenderOptions, input: SharedInput) -> Self {
        let script = Script::load(path).with_options(options);
        Self {
            script,
            live: LiveValues::new(),
            input,
            watcher: None,
        }
    }

    /// Starts reloading whenever the file changes on disk.
    pub fn watch(&mut self) {
        match ScriptWatcher::new(self.script.path()) {
            Ok(watcher) => {
                info!(path = %self.script.path().display(), "watching script");
                self.watcher = Some(watcher);
            }
            Err(e) => warn!(error = %e, "auto reload disabled"),
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Recompiles and re-runs the init phase. Widget values are dropped
    /// because the panel is rebuilt from the new parameter set.
    pub fn reload(&mut self) {
        info!(path = %self.script.path().display(), "reloading");
        if let Err(e) = self.script.reload() {
            warn!(error = %e, "reload incomplete");
        }
        self.live.clear();
    }

    /// Drains pending change notifications; reloads once if there were any.
    pub fn poll_watcher(&mut self) -> bool {
        let changed = self
            .watcher
            .as_ref()
            .is_some_and(|watcher| watcher.take_pending());
        if changed {
            self.reload();
        }
        changed
    }

    /// Draws one frame with the current widget values and streamed input.
    pub fn render(&mut self, cr: &cairo::Context, viewport: Viewport) -> Result<(), RenderError> {
        let frame = Frame::new(viewport).with_input(self.input.latest());
        self.script.run(cr, &frame, &self.live)
    }

    /// Position under the pointer in the script's final coordinates.
    pub fn point_at(&self, x: f64, y: f64) -> Option<Point> {
        self.script.device_to_user(x, y)
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn path(&self) -> &Path {
        self.script.path()
    }

    /// Store the parameter widgets write into.
    pub fn live(&self) -> &LiveValues {
        &self.live
    }
}

fn trim_number(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Script source text that reconstructs `p`, e.g. `Point(12.5, 3)`.
pub fn point_literal(p: Point) -> String {
    format!("Point({}, {})", trim_number(p.x), trim_number(p.y))
}
