//! Pointer drag state machine.
//!
//! Raw button/motion events are folded into a [`CursorState`]; after each
//! transition the resulting state is dispatched to exactly one method of a
//! [`DragSink`]. The `origin` captured on press is carried through every
//! following state so `rel()` is always the offset since the drag began.

use crate::geometry::Point;

/// Displacement (in the coordinates fed to the machine) below which a
/// press/release pair counts as a click.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Release(Point),
    Motion(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            Self::Press(p) | Self::Release(p) | Self::Motion(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorState {
    Hover { pos: Point },
    DragBegin { pos: Point, origin: Point },
    DragMove { pos: Point, origin: Point },
    DragEnd { pos: Point, origin: Point },
    /// Released without meaningful displacement.
    Click { pos: Point, origin: Point },
}

impl Default for CursorState {
    fn default() -> Self {
        Self::Hover { pos: Point::ORIGIN }
    }
}

impl CursorState {
    pub fn pos(&self) -> Point {
        match *self {
            Self::Hover { pos }
            | Self::DragBegin { pos, .. }
            | Self::DragMove { pos, .. }
            | Self::DragEnd { pos, .. }
            | Self::Click { pos, .. } => pos,
        }
    }

    pub fn origin(&self) -> Option<Point> {
        match *self {
            Self::Hover { .. } => None,
            Self::DragBegin { origin, .. }
            | Self::DragMove { origin, .. }
            | Self::DragEnd { origin, .. }
            | Self::Click { origin, .. } => Some(origin),
        }
    }

    /// Offset of the current position from the drag origin; zero while hovering.
    pub fn rel(&self) -> Point {
        self.origin()
            .map(|origin| self.pos() - origin)
            .unwrap_or(Point::ORIGIN)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::DragBegin { .. } | Self::DragMove { .. })
    }

    /// Pure transition function.
    ///
    /// A release always ends the current gesture. Releasing from `DragMove`
    /// reports `Click` when the total displacement is below `threshold`,
    /// otherwise `DragEnd`.
    pub fn next(self, event: PointerEvent, threshold: f64) -> CursorState {
        use PointerEvent::*;

        match (self, event) {
            (Self::Hover { .. } | Self::Click { .. } | Self::DragEnd { .. }, Press(pos)) => {
                Self::DragBegin { pos, origin: pos }
            }
            (Self::Hover { .. } | Self::Click { .. } | Self::DragEnd { .. }, Release(pos)) => {
                Self::Hover { pos }
            }
            (Self::Hover { .. } | Self::Click { .. } | Self::DragEnd { .. }, Motion(pos)) => {
                Self::Hover { pos }
            }

            // a second press while a button is held resets the gesture
            (Self::DragBegin { .. } | Self::DragMove { .. }, Press(pos)) => Self::Hover { pos },

            (Self::DragBegin { origin, .. }, Release(pos)) => Self::Click { pos, origin },
            (Self::DragBegin { origin, .. } | Self::DragMove { origin, .. }, Motion(pos)) => {
                Self::DragMove { pos, origin }
            }
            (Self::DragMove { origin, .. }, Release(pos)) => {
                if (pos - origin).magnitude() < threshold {
                    Self::Click { pos, origin }
                } else {
                    Self::DragEnd { pos, origin }
                }
            }
        }
    }

    /// Calls the one sink method matching this state. Returns whether the
    /// view should be redrawn.
    pub fn dispatch<S: DragSink + ?Sized>(&self, sink: &mut S) -> bool {
        match self {
            Self::Hover { .. } => sink.hover(self),
            Self::DragBegin { .. } => sink.begin(self),
            Self::DragMove { .. } => sink.drag(self),
            Self::DragEnd { .. } => sink.drop(self),
            Self::Click { .. } => sink.click(self),
        }
    }
}

/// Receiver of cursor state changes. Every method returns whether a redraw
/// is needed; the defaults ignore the event.
pub trait DragSink {
    fn hover(&mut self, _cursor: &CursorState) -> bool {
        false
    }

    fn begin(&mut self, _cursor: &CursorState) -> bool {
        false
    }

    fn drag(&mut self, _cursor: &CursorState) -> bool {
        false
    }

    fn drop(&mut self, _cursor: &CursorState) -> bool {
        false
    }

    fn click(&mut self, _cursor: &CursorState) -> bool {
        false
    }
}

/// Owns the current cursor state and the one sink it reports to.
#[derive(Debug)]
pub struct DragController<S> {
    state: CursorState,
    sink: S,
    threshold: f64,
}

impl<S: DragSink> DragController<S> {
    pub fn new(sink: S) -> Self {
        Self::with_threshold(sink, DEFAULT_DRAG_THRESHOLD)
    }

    pub fn with_threshold(sink: S, threshold: f64) -> Self {
        Self {
            state: CursorState::default(),
            sink,
            threshold,
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Advances the state machine and dispatches the resulting state.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        self.state = self.state.next(event, self.threshold);
        self.state.dispatch(&mut self.sink)
    }

    pub fn press(&mut self, pos: Point) -> bool {
        self.handle(PointerEvent::Press(pos))
    }

    pub fn release(&mut self, pos: Point) -> bool {
        self.handle(PointerEvent::Release(pos))
    }

    pub fn motion(&mut self, pos: Point) -> bool {
        self.handle(PointerEvent::Motion(pos))
    }
}

/// A scalar bound to a drag gesture.
pub trait ValueTarget {
    /// The drag started: snapshot whatever state the update needs.
    fn begin(&mut self, cursor: &CursorState);

    /// Recompute the value from the cursor.
    fn update_value(&mut self, cursor: &CursorState);
}

/// Sink that forwards drag progress to a single [`ValueTarget`].
#[derive(Debug)]
pub struct ValueController<T> {
    target: T,
}

impl<T: ValueTarget> ValueController<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T: ValueTarget> DragSink for ValueController<T> {
    fn begin(&mut self, cursor: &CursorState) -> bool {
        self.target.begin(cursor);
        false
    }

    fn drag(&mut self, cursor: &CursorState) -> bool {
        self.target.update_value(cursor);
        true
    }

    fn drop(&mut self, cursor: &CursorState) -> bool {
        self.target.update_value(cursor);
        true
    }

    fn click(&mut self, _cursor: &CursorState) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_tracks_origin() {
        let s = CursorState::Hover {
            pos: Point::new(5.0, 5.0),
        };
        let s = s.next(PointerEvent::Press(Point::new(10.0, 10.0)), 1.0);
        let s = s.next(PointerEvent::Motion(Point::new(13.0, 6.0)), 1.0);
        assert_eq!(s.origin(), Some(Point::new(10.0, 10.0)));
        assert_eq!(s.rel(), Point::new(3.0, -4.0));
    }

    #[test]
    fn test_hover_has_no_rel() {
        let s = CursorState::Hover {
            pos: Point::new(5.0, 5.0),
        };
        assert_eq!(s.rel(), Point::ORIGIN);
        assert!(s.origin().is_none());
    }

    #[test]
    fn test_drag_end_restarts_on_press() {
        let s = CursorState::DragEnd {
            pos: Point::new(9.0, 9.0),
            origin: Point::ORIGIN,
        };
        let s = s.next(PointerEvent::Press(Point::new(2.0, 2.0)), 1.0);
        assert_eq!(
            s,
            CursorState::DragBegin {
                pos: Point::new(2.0, 2.0),
                origin: Point::new(2.0, 2.0)
            }
        );
    }

    #[test]
    fn test_double_press_resets_to_hover() {
        let s = CursorState::default().next(PointerEvent::Press(Point::ORIGIN), 1.0);
        let s = s.next(PointerEvent::Press(Point::new(1.0, 0.0)), 1.0);
        assert!(matches!(s, CursorState::Hover { .. }));
    }
}
