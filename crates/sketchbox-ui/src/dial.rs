//! Rotary control for Angle and Infinite parameters.
//!
//! Dragging inside the dial feeds a [`ParameterDrag`] through the shared
//! cursor state machine; positions are reported relative to the dial's
//! center. The knob shows the current value as a rotation.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{DrawingArea, EventControllerMotion, GestureClick};
use sketchbox_core::{DragController, Point, Rect, ValueController};
use sketchbox_params::ParameterDrag;
use sketchbox_script::{DrawError, DrawingContext};
use tracing::warn;

pub const DIAL_SIZE: i32 = 30;
const DIAL_INSET: f64 = 5.0;
const RIM_WIDTH: f64 = 2.5;

type Controller = DragController<ValueController<ParameterDrag>>;

/// Position relative to the center of a `width` x `height` widget.
pub fn centered(x: f64, y: f64, width: f64, height: f64) -> Point {
    Point::new(x - width / 2.0, y - height / 2.0)
}

fn draw_dial(cr: &cairo::Context, width: f64, height: f64, value: f64) -> Result<(), DrawError> {
    let ctx = DrawingContext::new(cr);
    let window = Rect::from_top_left(Point::ORIGIN, width, height);
    let (_guard, bounds) = ctx.box_scope(window.inset(DIAL_INSET), false)?;
    let radius = bounds.width.min(bounds.height) * 0.5;
    ctx.circle(bounds.center, radius);
    cr.set_line_width(RIM_WIDTH);
    cr.stroke()?;
    cr.rotate(value);
    ctx.circle(Point::new(radius / 2.0, 0.0), radius / 4.0);
    cr.fill()?;
    Ok(())
}

/// A dial driving `drag`. `value` is read on every redraw.
pub fn dial(drag: ParameterDrag, threshold: f64, value: impl Fn() -> f64 + 'static) -> DrawingArea {
    let widget = DrawingArea::new();
    widget.set_content_width(DIAL_SIZE);
    widget.set_content_height(DIAL_SIZE);
    widget.set_draw_func(move |_, cr, width, height| {
        if let Err(e) = draw_dial(cr, width as f64, height as f64, value()) {
            warn!(error = %e, "dial drawing failed");
        }
    });

    let controller = Rc::new(RefCell::new(DragController::with_threshold(
        ValueController::new(drag),
        threshold,
    )));

    let click = GestureClick::new();
    let ctl = controller.clone();
    let area = widget.clone();
    click.connect_pressed(move |_, _, x, y| {
        let pos = centered(x, y, area.width() as f64, area.height() as f64);
        if ctl.borrow_mut().press(pos) {
            area.queue_draw();
        }
    });
    let ctl = controller.clone();
    let area = widget.clone();
    click.connect_released(move |_, _, x, y| {
        let pos = centered(x, y, area.width() as f64, area.height() as f64);
        if ctl.borrow_mut().release(pos) {
            area.queue_draw();
        }
    });
    widget.add_controller(click);

    let motion = EventControllerMotion::new();
    let ctl = controller;
    let area = widget.clone();
    motion.connect_motion(move |_, x, y| {
        let pos = centered(x, y, area.width() as f64, area.height() as f64);
        if ctl.borrow_mut().motion(pos) {
            area.queue_draw();
        }
    });
    widget.add_controller(motion);

    widget
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered() {
        assert_eq!(centered(15.0, 15.0, 30.0, 30.0), Point::ORIGIN);
        assert_eq!(centered(30.0, 0.0, 30.0, 30.0), Point::new(15.0, -15.0));
    }

    #[test]
    fn test_draw_dial_marks_surface() {
        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 30, 30).unwrap();
        {
            let cr = cairo::Context::new(&surface).unwrap();
            draw_dial(&cr, 30.0, 30.0, 1.0).unwrap();
            assert_eq!(cr.matrix().x0(), 0.0);
        }
        let data = surface.data().unwrap();
        assert!(data.iter().any(|b| *b != 0));
    }

    #[test]
    fn test_draw_dial_reports_context_errors() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 30, 30).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();
        cr.translate(f64::NAN, 0.0);
        assert!(draw_dial(&cr, 30.0, 30.0, 1.0).is_err());
    }
}
