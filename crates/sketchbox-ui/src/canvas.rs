//! The render window's drawing area.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gdk, DrawingArea, EventControllerMotion, GestureClick, ScrolledWindow, Widget};
use sketchbox_core::{CursorState, DragController, DragSink, Point};
use sketchbox_params::Resolution;
use sketchbox_script::{Viewport, FALLBACK_DPI};
use tracing::{info, warn};

use crate::clipboard::PointClipboard;
use crate::session::{point_literal, Session};

/// Pixel geometry and physical size (mm) of the display's first monitor.
fn monitor_geometry(widget: &impl IsA<Widget>) -> Option<((i32, i32), (i32, i32))> {
    let monitor = widget
        .display()
        .monitors()
        .item(0)
        .and_downcast::<gdk::Monitor>()?;
    let geometry = monitor.geometry();
    Some((
        (geometry.width(), geometry.height()),
        (monitor.width_mm(), monitor.height_mm()),
    ))
}

/// Device units per millimeter from the monitor, or 96 dpi when the
/// monitor does not report a physical size.
fn viewport_for(widget: &impl IsA<Widget>, width: f64, height: f64) -> Viewport {
    match monitor_geometry(widget) {
        Some((px, mm)) => Viewport::from_monitor(width, height, px, mm),
        None => Viewport::from_dpi(width, height, FALLBACK_DPI),
    }
}

/// Clicks copy the script-space position as a `Point(x, y)` literal.
struct CanvasPointer {
    session: Rc<RefCell<Session>>,
    clipboard: PointClipboard,
}

impl DragSink for CanvasPointer {
    fn click(&mut self, cursor: &CursorState) -> bool {
        let pos = cursor.pos();
        let Some(point) = self.session.borrow().point_at(pos.x, pos.y) else {
            return false;
        };
        let literal = point_literal(point);
        info!(point = %literal, "clicked");
        if let Err(e) = self.clipboard.copy(&literal) {
            warn!(error = %e, "cannot copy point to clipboard");
        }
        false
    }
}

pub struct RenderView {
    pub scrolled: ScrolledWindow,
    pub area: DrawingArea,
}

impl RenderView {
    pub fn new(session: Rc<RefCell<Session>>, drag_threshold: f64) -> Self {
        let area = DrawingArea::new();
        area.set_focusable(true);

        let draw_session = session.clone();
        area.set_draw_func(move |area, cr, width, height| {
            let viewport = viewport_for(area, width as f64, height as f64);
            if let Ok(mut session) = draw_session.try_borrow_mut() {
                // failures are recorded and drawn by the script itself
                let _ = session.render(cr, viewport);
            }
        });

        let pointer = Rc::new(RefCell::new(DragController::with_threshold(
            CanvasPointer {
                session,
                clipboard: PointClipboard::default(),
            },
            drag_threshold,
        )));

        let click = GestureClick::new();
        let (ctl, da) = (pointer.clone(), area.clone());
        click.connect_pressed(move |_, _, x, y| {
            da.grab_focus();
            if ctl.borrow_mut().press(Point::new(x, y)) {
                da.queue_draw();
            }
        });
        let (ctl, da) = (pointer.clone(), area.clone());
        click.connect_released(move |_, _, x, y| {
            if ctl.borrow_mut().release(Point::new(x, y)) {
                da.queue_draw();
            }
        });
        area.add_controller(click);

        let motion = EventControllerMotion::new();
        let (ctl, da) = (pointer, area.clone());
        motion.connect_motion(move |_, x, y| {
            if ctl.borrow_mut().motion(Point::new(x, y)) {
                da.queue_draw();
            }
        });
        area.add_controller(motion);

        let scrolled = ScrolledWindow::builder()
            .child(&area)
            .propagate_natural_width(true)
            .propagate_natural_height(true)
            .build();

        Self { scrolled, area }
    }

    /// Requests the script's declared output size.
    pub fn set_resolution(&self, resolution: Resolution) {
        self.area.set_content_width(resolution.width as i32);
        self.area.set_content_height(resolution.height as i32);
    }
}
