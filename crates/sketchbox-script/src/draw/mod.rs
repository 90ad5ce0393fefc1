//! # Drawing context
//!
//! [`DrawingContext`] wraps a `cairo::Context` and tracks its save depth so
//! every save/restore pair stays balanced, even when a script raises
//! halfway through a scope. Shape helpers only build paths; painting is
//! left to the caller.

pub mod pattern;
pub mod style;
pub mod text;

use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;

use sketchbox_core::{Guides, Point, Rect, Rgba};

use crate::error::DrawError;

pub use pattern::{Gradient, ImageCache, ImagePattern};
pub use text::FontSpec;

/// Line width used by debug strokes, in user units.
pub const DEFAULT_DEBUG_LINE_WIDTH: f64 = 0.1;

#[derive(Clone)]
pub struct DrawingContext {
    cr: cairo::Context,
    depth: Rc<Cell<usize>>,
    debug_line_width: f64,
}

/// Restores the context to the depth it had before the matching save.
#[must_use = "the saved state is restored when the guard is dropped"]
pub struct SaveGuard {
    ctx: DrawingContext,
    depth: usize,
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        self.ctx.unwind_to(self.depth);
    }
}

impl DrawingContext {
    pub fn new(cr: &cairo::Context) -> Self {
        Self {
            cr: cr.clone(),
            depth: Rc::new(Cell::new(0)),
            debug_line_width: DEFAULT_DEBUG_LINE_WIDTH,
        }
    }

    pub fn with_debug_line_width(mut self, width: f64) -> Self {
        self.debug_line_width = width;
        self
    }

    pub fn cr(&self) -> &cairo::Context {
        &self.cr
    }

    /// Number of saves currently outstanding.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Scoped save; the state is restored when the guard drops.
    pub fn save(&self) -> Result<SaveGuard, DrawError> {
        let depth = self.depth();
        self.push()?;
        Ok(SaveGuard {
            ctx: self.clone(),
            depth,
        })
    }

    /// Unscoped save, as issued by `cr.save()` in scripts.
    pub fn push(&self) -> Result<(), DrawError> {
        self.cr.save()?;
        self.depth.set(self.depth() + 1);
        Ok(())
    }

    /// Unscoped restore. Refuses to pop past the outermost save so the
    /// cairo context never enters its invalid-restore error state.
    pub fn pop(&self) -> Result<(), DrawError> {
        if self.depth() == 0 {
            return Err(DrawError::UnbalancedRestore);
        }
        self.depth.set(self.depth() - 1);
        self.cr.restore()?;
        Ok(())
    }

    /// Restores until `depth` saves remain; returns how many were undone.
    pub fn unwind_to(&self, depth: usize) -> usize {
        let mut undone = 0;
        while self.depth() > depth {
            self.depth.set(self.depth() - 1);
            let _ = self.cr.restore();
            undone += 1;
        }
        undone
    }

    /// Saves, optionally clips to `rect`, and moves the origin to its
    /// center. Returns the guard and `rect` in the new local coordinates.
    pub fn box_scope(&self, rect: Rect, clip: bool) -> Result<(SaveGuard, Rect), DrawError> {
        let guard = self.save()?;
        if clip {
            let nw = rect.northwest();
            self.cr.rectangle(nw.x, nw.y, rect.width, rect.height);
            self.cr.clip();
        }
        self.cr.translate(rect.center.x, rect.center.y);
        Ok((guard, rect.local()))
    }

    pub fn scale(&self, x: f64, y: f64) -> Result<(), DrawError> {
        if x == 0.0 || y == 0.0 || !x.is_finite() || !y.is_finite() {
            return Err(DrawError::DegenerateScale { x, y });
        }
        self.cr.scale(x, y);
        Ok(())
    }

    pub fn set_color(&self, color: Rgba) {
        self.cr.set_source_rgba(color.r, color.g, color.b, color.a);
    }

    pub fn move_to(&self, p: Point) {
        self.cr.move_to(p.x, p.y);
    }

    pub fn line_to(&self, p: Point) {
        self.cr.line_to(p.x, p.y);
    }

    pub fn curve_to(&self, a: Point, b: Point, c: Point) {
        self.cr.curve_to(a.x, a.y, b.x, b.y, c.x, c.y);
    }

    pub fn circle(&self, center: Point, radius: f64) {
        self.cr.new_sub_path();
        self.cr.arc(center.x, center.y, radius, 0.0, TAU);
    }

    /// Ellipse around `center` with horizontal semi-axis `width` and
    /// vertical semi-axis `height`.
    pub fn ellipse(&self, center: Point, width: f64, height: f64) {
        if width == 0.0 || height == 0.0 {
            return;
        }
        let saved = self.cr.matrix();
        self.cr.translate(center.x, center.y);
        self.cr.scale(width, height);
        self.cr.new_sub_path();
        self.cr.arc(0.0, 0.0, 1.0, 0.0, TAU);
        self.cr.set_matrix(saved);
    }

    pub fn center_rect(&self, center: Point, width: f64, height: f64) {
        self.cr
            .rectangle(center.x - 0.5 * width, center.y - 0.5 * height, width, height);
    }

    pub fn rect(&self, rect: Rect) {
        self.center_rect(rect.center, rect.width, rect.height);
    }

    pub fn polygon(&self, points: &[Point], close: bool) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        if close {
            self.cr.close_path();
        }
    }

    /// Horizontal line at `y` spanning `bounds`.
    pub fn hline(&self, y: f64, bounds: Rect) {
        self.move_to(Point::new(bounds.west().x, y));
        self.line_to(Point::new(bounds.east().x, y));
    }

    /// Vertical line at `x` spanning `bounds`.
    pub fn vline(&self, x: f64, bounds: Rect) {
        self.move_to(Point::new(x, bounds.north().y));
        self.line_to(Point::new(x, bounds.south().y));
    }

    pub fn crosshair(&self, center: Point, size: f64) {
        self.move_to(center - Point::new(size, 0.0));
        self.line_to(center + Point::new(size, 0.0));
        self.move_to(center - Point::new(0.0, size));
        self.line_to(center + Point::new(0.0, size));
    }

    pub fn current_point(&self) -> Option<Point> {
        if !self.cr.has_current_point().unwrap_or(false) {
            return None;
        }
        self.cr.current_point().ok().map(Point::from)
    }

    /// Shows `text` centered on the current point (or the origin).
    pub fn center_text(&self, text: &str, font: Option<&FontSpec>) -> Result<(), DrawError> {
        if let Some(font) = font {
            font.apply(&self.cr);
        }
        let at = self.current_point().unwrap_or(Point::ORIGIN);
        let extents = self.cr.text_extents(text)?;
        self.cr.move_to(
            at.x - (extents.x_bearing() + extents.width() * 0.5),
            at.y - (extents.y_bearing() + extents.height() * 0.5),
        );
        self.cr.show_text(text)?;
        Ok(())
    }

    pub fn show_text(&self, text: &str, font: Option<&FontSpec>) -> Result<(), DrawError> {
        if let Some(font) = font {
            font.apply(&self.cr);
        }
        self.cr.show_text(text)?;
        Ok(())
    }

    fn debug_style(&self) {
        self.cr.set_operator(cairo::Operator::Difference);
        self.cr.set_source_rgb(1.0, 1.0, 1.0);
        self.cr.set_line_width(self.debug_line_width);
    }

    /// Strokes the current path so it stays visible over any background.
    pub fn debug_stroke(&self) -> Result<(), DrawError> {
        let _guard = self.save()?;
        self.debug_style();
        self.cr.stroke()?;
        Ok(())
    }

    pub fn debug_fill(&self) -> Result<(), DrawError> {
        let _guard = self.save()?;
        self.debug_style();
        self.cr.fill()?;
        Ok(())
    }

    /// Strokes every guide line in the debug style.
    pub fn debug_guides(&self, guides: &Guides) -> Result<(), DrawError> {
        for (a, b) in guides.lines() {
            self.move_to(a);
            self.line_to(b);
        }
        self.debug_stroke()
    }
}
