//! # Script Execution Engine
//!
//! A [`Script`] compiles its source once per load and runs the same AST in
//! two phases:
//!
//! - **init** (on every reload): `PHASE == "init"` and a fresh `params`
//!   registry. Definitions made before an error are kept.
//! - **render** (every frame): `PHASE == "render"`, the drawing context,
//!   the window in millimeters, parameter values, time and streamed input.
//!
//! Script errors never escape a phase: they are recorded on the script,
//! logged, and drawn on the surface when the error overlay is enabled.

use rhai::{Dynamic, Engine, Map, Scope, AST};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use sketchbox_core::{Point, Rect, Rgba};
use sketchbox_params::{ParameterGroup, Resolution, ValueSource};

use crate::api::{self, value_to_dynamic, ContextSlot, Helpers, ParameterRegistry};
use crate::diagnostics::Located;
use crate::draw::{DrawingContext, FontSpec, ImageCache, DEFAULT_DEBUG_LINE_WIDTH};
use crate::error::{CompileError, DrawError, InitError, LoadError, RenderError};
use crate::input::{InputSnapshot, InputValue};
use crate::pipeline::{Frame, Viewport};

pub const PHASE_INIT: &str = "init";
pub const PHASE_RENDER: &str = "render";

/// Vertical distance between lines of the error overlay, in device units.
pub const DEFAULT_ERROR_LINE_ADVANCE: f64 = 10.0;
/// Half the arm length of the current-point marker, in device pixels.
pub const DEFAULT_CROSSHAIR_SIZE: f64 = 5.0;
const CROSSHAIR_LINE_WIDTH: f64 = 1.0;

const ERROR_INSET: f64 = 10.0;
const ERROR_COLOR: Rgba = Rgba {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

/// Names bound by the render phase itself; parameters never shadow them.
const BUILTIN_BINDINGS: &[&str] = &[
    "PHASE", "cr", "helpers", "window", "scale_mm", "params", "time", "elapsed", "stdin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    Unloaded,
    Compiling,
    Ready,
    CompileFailed,
    InitFailed,
    Rendering,
    RenderFailed,
}

/// How a frame's diagnostics are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Draw error text over the frame. Headless runs report to stderr instead.
    pub error_overlay: bool,
    pub error_line_advance: f64,
    pub crosshair_size: f64,
    pub debug_line_width: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            error_overlay: true,
            error_line_advance: DEFAULT_ERROR_LINE_ADVANCE,
            crosshair_size: DEFAULT_CROSSHAIR_SIZE,
            debug_line_width: DEFAULT_DEBUG_LINE_WIDTH,
        }
    }
}

pub struct Script {
    path: PathBuf,
    source: String,
    ast: Option<AST>,
    params: ParameterGroup,
    status: ScriptStatus,
    load_error: Option<LoadError>,
    render_error: Option<RenderError>,
    transform: Option<cairo::Matrix>,
    inverse: Option<cairo::Matrix>,
    last_point: Option<Point>,
    loaded_at: Instant,
    images: ImageCache,
    options: RenderOptions,
    init_engine: Engine,
    render_engine: Engine,
    slot: ContextSlot,
}

fn is_bindable(name: &str) -> bool {
    let mut chars = name.chars();
    let head = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !BUILTIN_BINDINGS.contains(&name)
}

fn input_map(input: &InputSnapshot) -> Map {
    input
        .iter()
        .map(|(name, value)| {
            let value = match value {
                InputValue::Number(n) => Dynamic::from_float(*n),
                InputValue::Text(s) => Dynamic::from(s.clone()),
                InputValue::Bool(b) => Dynamic::from_bool(*b),
            };
            (name.into(), value)
        })
        .collect()
}

fn host_error(err: DrawError) -> RenderError {
    RenderError::host(err.to_string())
}

impl Script {
    /// An unloaded script; call [`Script::reload`] to compile it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let slot = ContextSlot::default();
        Self {
            path: path.into(),
            source: String::new(),
            ast: None,
            params: ParameterGroup::new(),
            status: ScriptStatus::Unloaded,
            load_error: None,
            render_error: None,
            transform: None,
            inverse: None,
            last_point: None,
            loaded_at: Instant::now(),
            images: ImageCache::new(),
            options: RenderOptions::default(),
            init_engine: api::init_engine(),
            render_engine: api::render_engine(slot.clone()),
            slot,
        }
    }

    /// Creates and loads a script. A failed load is recorded, not returned.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut script = Self::new(path);
        let _ = script.reload();
        script
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads, compiles and runs the init phase.
    ///
    /// A read or compile failure leaves the previous program and parameters
    /// in place. An init failure keeps the parameters defined before it.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        self.status = ScriptStatus::Compiling;
        info!(path = %self.path.display(), "loading script");

        let source = match fs::read_to_string(&self.path) {
            Ok(source) => source,
            Err(e) => {
                let err = LoadError::Read {
                    path: self.path.clone(),
                    message: e.to_string(),
                };
                return Err(self.fail_load(ScriptStatus::CompileFailed, err));
            }
        };

        let ast = match self.init_engine.compile(&source) {
            Ok(ast) => ast,
            Err(e) => {
                let located = Located::from_parse(&e);
                let err = CompileError {
                    diagnostics: located.report("compile", &self.path, &source),
                    message: located.message,
                    line: located.line,
                    column: located.column,
                };
                return Err(self.fail_load(ScriptStatus::CompileFailed, err.into()));
            }
        };

        self.source = source;
        self.images.clear();
        self.loaded_at = Instant::now();
        self.load_error = None;
        self.render_error = None;

        let registry = ParameterRegistry::new();
        let mut scope = Scope::new();
        scope.push_constant("PHASE", PHASE_INIT.to_string());
        scope.push("params", registry.clone());
        let result = self.init_engine.run_ast_with_scope(&mut scope, &ast);

        self.params = registry.take();
        self.ast = Some(ast);

        match result {
            Ok(()) => {
                self.status = ScriptStatus::Ready;
                info!(
                    path = %self.path.display(),
                    params = self.params.len(),
                    "script loaded"
                );
                Ok(())
            }
            Err(e) => {
                let located = Located::from_eval(&e);
                let err = InitError {
                    diagnostics: located.report(PHASE_INIT, &self.path, &self.source),
                    message: located.message,
                    line: located.line,
                    column: located.column,
                };
                Err(self.fail_load(ScriptStatus::InitFailed, err.into()))
            }
        }
    }

    fn fail_load(&mut self, status: ScriptStatus, err: LoadError) -> LoadError {
        error!(path = %self.path.display(), "{}", err.diagnostics());
        self.status = status;
        self.load_error = Some(err.clone());
        err
    }

    /// Draws one frame into `cr`.
    ///
    /// The script sees millimeters; overlays and error text are drawn
    /// whether or not it succeeded. The returned error has already been
    /// recorded and, if enabled, drawn.
    pub fn run(
        &mut self,
        cr: &cairo::Context,
        frame: &Frame,
        values: &dyn ValueSource,
    ) -> Result<(), RenderError> {
        let host = DrawingContext::new(cr).with_debug_line_width(self.options.debug_line_width);
        let ran = self.ast.is_some();
        if ran {
            self.status = ScriptStatus::Rendering;
        }

        let result = {
            let _frame_guard = host.save().map_err(host_error)?;
            host.scale(frame.viewport.scale.x, frame.viewport.scale.y)
                .map_err(host_error)?;
            self.render_phase(cr, frame, values)
        };

        if ran {
            self.record(&result);
        }

        if self.options.error_overlay {
            let text = match (&result, &self.load_error) {
                (Err(e), _) => Some(e.diagnostics.clone()),
                (Ok(()), Some(e)) => Some(e.diagnostics()),
                (Ok(()), None) => None,
            };
            if let Some(text) = text {
                if let Err(e) = self.draw_error_text(&host, frame.viewport, &text) {
                    debug!(error = %e, "error overlay failed");
                }
            }
        }
        result
    }

    /// Runs the script in the millimeter space set up by [`Script::run`],
    /// then captures its final transform and draws the overlays.
    fn render_phase(
        &mut self,
        cr: &cairo::Context,
        frame: &Frame,
        values: &dyn ValueSource,
    ) -> Result<(), RenderError> {
        let Some(ast) = self.ast.as_ref() else {
            return Ok(());
        };

        let ctx = DrawingContext::new(cr).with_debug_line_width(self.options.debug_line_width);
        let result = self.execute(ast, &ctx, frame.viewport.script_window(), frame, values);

        let matrix = cr.matrix();
        self.transform = Some(matrix);
        self.inverse = matrix.try_invert().ok();
        self.last_point = ctx.current_point().map(|p| {
            let (x, y) = matrix.transform_point(p.x, p.y);
            Point::new(x, y)
        });

        let leaked = ctx.unwind_to(0);
        if leaked > 0 {
            warn!(
                path = %self.path.display(),
                count = leaked,
                "restoring saves left open by the script"
            );
        }

        if let Err(e) = self.draw_overlays(&ctx, matrix) {
            debug!(error = %e, "overlay drawing failed");
        }
        result
    }

    fn execute(
        &self,
        ast: &AST,
        ctx: &DrawingContext,
        window: Rect,
        frame: &Frame,
        values: &dyn ValueSource,
    ) -> Result<(), RenderError> {
        let values = self
            .params
            .values(values)
            .map_err(|e| RenderError::host(e.to_string()))?;

        let mut scope = Scope::new();
        let mut params = Map::new();
        for (name, value) in values.iter() {
            let value = value_to_dynamic(value, &self.images);
            if is_bindable(name) {
                scope.push_dynamic(name.to_string(), value.clone());
            }
            params.insert(name.into(), value);
        }

        scope.push_constant("PHASE", PHASE_RENDER.to_string());
        scope.push("cr", ctx.clone());
        scope.push("helpers", Helpers::new(ctx.clone()));
        scope.push("window", window);
        scope.push("scale_mm", frame.viewport.scale);
        scope.push("params", params);
        scope.push("time", frame.time);
        scope.push("elapsed", self.elapsed().as_secs_f64());
        scope.push("stdin", input_map(&frame.input));

        self.slot.set(ctx.clone());
        let result = self.render_engine.run_ast_with_scope(&mut scope, ast);
        self.slot.clear();

        result.map_err(|e| {
            let located = Located::from_eval(&e);
            RenderError {
                diagnostics: located.report(PHASE_RENDER, &self.path, &self.source),
                message: located.message,
                line: located.line,
                column: located.column,
            }
        })
    }

    fn record(&mut self, result: &Result<(), RenderError>) {
        match result {
            Ok(()) => {
                self.status = ScriptStatus::Ready;
                if self.render_error.take().is_some() {
                    info!(path = %self.path.display(), "render recovered");
                }
            }
            Err(e) => {
                self.status = ScriptStatus::RenderFailed;
                if self.render_error.as_ref() != Some(e) {
                    error!(path = %self.path.display(), "{}", e.diagnostics);
                }
                self.render_error = Some(e.clone());
            }
        }
    }

    /// Strokes any path the script left behind, then marks the last
    /// current point.
    fn draw_overlays(&self, ctx: &DrawingContext, script_matrix: cairo::Matrix) -> Result<(), DrawError> {
        if script_matrix.try_invert().is_ok() {
            let _guard = ctx.save()?;
            ctx.cr().set_matrix(script_matrix);
            ctx.debug_stroke()?;
        } else {
            ctx.cr().new_path();
        }

        if let Some(device) = self.last_point {
            let marker = ctx.clone().with_debug_line_width(CROSSHAIR_LINE_WIDTH);
            let _guard = marker.save()?;
            marker.cr().identity_matrix();
            marker.crosshair(device, self.options.crosshair_size);
            marker.debug_stroke()?;
        }
        Ok(())
    }

    /// Error text line by line in an unclipped box inset from the surface.
    fn draw_error_text(
        &self,
        host: &DrawingContext,
        viewport: Viewport,
        text: &str,
    ) -> Result<(), DrawError> {
        let (_guard, local) = host.box_scope(viewport.window().inset(ERROR_INSET), false)?;
        host.set_color(ERROR_COLOR);
        FontSpec::default().apply(host.cr());
        let mut at = local.northwest();
        for line in text.lines() {
            at.y += self.options.error_line_advance;
            host.move_to(at);
            host.cr().show_text(line)?;
        }
        host.cr().new_path();
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether a program is available to render.
    pub fn is_loaded(&self) -> bool {
        self.ast.is_some()
    }

    pub fn params(&self) -> &ParameterGroup {
        &self.params
    }

    pub fn resolution(&self) -> Resolution {
        self.params.resolution()
    }

    pub fn status(&self) -> ScriptStatus {
        self.status
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn render_error(&self) -> Option<&RenderError> {
        self.render_error.as_ref()
    }

    /// User-to-device transform at the end of the last render.
    pub fn transform(&self) -> Option<cairo::Matrix> {
        self.transform
    }

    pub fn inverse(&self) -> Option<cairo::Matrix> {
        self.inverse
    }

    /// Last current point of the script's path, in device units.
    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    /// Maps a device position into the script's final coordinate space.
    pub fn device_to_user(&self, x: f64, y: f64) -> Option<Point> {
        self.inverse.map(|m| {
            let (x, y) = m.transform_point(x, y);
            Point::new(x, y)
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.loaded_at.elapsed()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Decoded images for this load.
    pub fn images(&self) -> &ImageCache {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchbox_params::Defaults;
    use std::io::Write;

    fn script(source: &str) -> (tempfile::NamedTempFile, Script) {
        let mut file = tempfile::Builder::new().suffix(".rhai").tempfile().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        let script = Script::load(file.path());
        (file, script)
    }

    fn render(script: &mut Script) -> Result<(), RenderError> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 100, 100).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();
        let frame = Frame::new(Viewport::from_dpi(100.0, 100.0, 25.4));
        script.run(&cr, &frame, &Defaults)
    }

    #[test]
    fn test_bindable_names() {
        assert!(is_bindable("radius"));
        assert!(is_bindable("_r2"));
        assert!(!is_bindable("2r"));
        assert!(!is_bindable("line width"));
        assert!(!is_bindable("window"));
        assert!(!is_bindable(""));
    }

    #[test]
    fn test_unloaded_script_renders_nothing() {
        let mut script = Script::new("/nonexistent/never.rhai");
        assert_eq!(script.status(), ScriptStatus::Unloaded);
        assert!(render(&mut script).is_ok());
        assert_eq!(script.status(), ScriptStatus::Unloaded);
        assert!(script.transform().is_none());
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let script = Script::load("/nonexistent/never.rhai");
        assert!(matches!(script.load_error(), Some(LoadError::Read { .. })));
        assert_eq!(script.status(), ScriptStatus::CompileFailed);
    }

    #[test]
    fn test_transform_is_captured() {
        let (_file, mut script) = script(
            r#"
            if PHASE == "render" {
                cr.translate(10, 0);
                helpers.move_to(Point(1, 2));
            }
            "#,
        );
        render(&mut script).unwrap();
        // 1 px per mm, shifted 10 mm right.
        let (x, y) = script.transform().unwrap().transform_point(0.0, 0.0);
        assert_eq!((x, y), (10.0, 0.0));
        assert_eq!(script.last_point(), Some(Point::new(11.0, 2.0)));
        assert_eq!(script.device_to_user(11.0, 2.0), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_window_and_scale_bindings() {
        let (_file, mut script) = script(
            r#"
            if PHASE == "render" {
                if window.width != 100.0 { throw `width ${window.width}`; }
                if scale_mm.x != 1.0 { throw "scale"; }
                if elapsed < 0.0 { throw "elapsed"; }
            }
            "#,
        );
        render(&mut script).unwrap();
        assert_eq!(script.status(), ScriptStatus::Ready);
    }
}
