//! Layout algebra used by scripts.
//!
//! All types here are plain `Copy`/`Clone` values without side effects.
//! Coordinates follow the drawing surface convention: +x to the right,
//! +y downwards, so "north" is the smaller y.

mod guides;
mod point;
mod rect;

pub use guides::Guides;
pub use point::Point;
pub use rect::Rect;

/// Tolerance used by approximate comparisons in this module.
pub const EPSILON: f64 = 1e-9;

/// Returns true when two floats are equal within `EPSILON` scaled to magnitude.
pub fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= EPSILON * scale
}
