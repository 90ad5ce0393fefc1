//! # Sketchbox Core
//!
//! Value types shared by every other Sketchbox crate:
//! - `geometry`: points, rectangles and guide grids used for layout in scripts
//! - `color`: straight-alpha RGBA colors
//! - `units`: physical unit conversions (mm, pt, in)
//! - `cursor`: the pointer drag state machine and its sink interface

pub mod color;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod units;

pub use color::Rgba;
pub use cursor::{
    CursorState, DragController, DragSink, PointerEvent, ValueController, ValueTarget,
    DEFAULT_DRAG_THRESHOLD,
};
pub use error::{ColorParseError, UnitParseError};
pub use geometry::{Guides, Point, Rect};
pub use units::{LengthUnit, MM_PER_INCH, PT_PER_INCH};
