//! One frame: viewport and physical scale in, script render out.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sketchbox_core::units::px_per_mm;
use sketchbox_core::{Point, Rect};
use sketchbox_params::ValueSource;

use crate::engine::Script;
use crate::error::RenderError;
use crate::input::InputSnapshot;

/// Assumed pixel density when a monitor reports no physical size.
pub const FALLBACK_DPI: f64 = 96.0;

/// The device surface a frame is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in device units.
    pub width: f64,
    /// Height in device units.
    pub height: f64,
    /// Device units per millimeter on each axis.
    pub scale: Point,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scale: Point) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    pub fn from_dpi(width: f64, height: f64, dpi: f64) -> Self {
        let s = px_per_mm(dpi);
        Self::new(width, height, Point::new(s, s))
    }

    /// Scale from a monitor's pixel geometry and physical size in mm.
    pub fn from_monitor(
        width: f64,
        height: f64,
        monitor_px: (i32, i32),
        monitor_mm: (i32, i32),
    ) -> Self {
        let (px_w, px_h) = monitor_px;
        let (mm_w, mm_h) = monitor_mm;
        if mm_w <= 0 || mm_h <= 0 || px_w <= 0 || px_h <= 0 {
            return Self::from_dpi(width, height, FALLBACK_DPI);
        }
        let scale = Point::new(px_w as f64 / mm_w as f64, px_h as f64 / mm_h as f64);
        Self::new(width, height, scale)
    }

    /// The surface in device units, anchored at the top left.
    pub fn window(&self) -> Rect {
        Rect::from_top_left(Point::ORIGIN, self.width, self.height)
    }

    /// The surface in millimeters, as the script sees it.
    pub fn script_window(&self) -> Rect {
        Rect::from_top_left(
            Point::ORIGIN,
            self.width / self.scale.x,
            self.height / self.scale.y,
        )
    }
}

/// Everything a render pass needs besides the script and its values.
#[derive(Debug, Clone)]
pub struct Frame {
    pub viewport: Viewport,
    /// Wall clock, seconds since the Unix epoch.
    pub time: f64,
    pub input: Arc<InputSnapshot>,
}

impl Frame {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            time: wall_clock(),
            input: Arc::new(InputSnapshot::default()),
        }
    }

    pub fn with_input(mut self, input: Arc<InputSnapshot>) -> Self {
        self.input = input;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }
}

pub fn wall_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Renders one frame. Script failures are drawn by the engine and also
/// returned so headless callers can report them.
pub fn render_frame(
    script: &mut Script,
    cr: &cairo::Context,
    viewport: Viewport,
    input: Arc<InputSnapshot>,
    values: &dyn ValueSource,
) -> Result<(), RenderError> {
    let frame = Frame::new(viewport).with_input(input);
    script.run(cr, &frame, values)
}
