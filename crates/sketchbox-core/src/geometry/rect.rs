use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Guides, Point};

/// Axis-aligned rectangle stored as center plus extent.
///
/// Width and height may be negative after an oversized `inset`; every
/// method still returns a well-defined result in that case.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Builds a rectangle whose northwest corner is `top_left`.
    pub fn from_top_left(top_left: Point, width: f64, height: f64) -> Self {
        Self {
            center: top_left + Point::new(width * 0.5, height * 0.5),
            width,
            height,
        }
    }

    /// Builds the rectangle spanning two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            center: (a + b) * 0.5,
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn north(&self) -> Point {
        self.center + Point::new(0.0, -0.5 * self.height)
    }

    pub fn south(&self) -> Point {
        self.center + Point::new(0.0, 0.5 * self.height)
    }

    pub fn east(&self) -> Point {
        self.center + Point::new(0.5 * self.width, 0.0)
    }

    pub fn west(&self) -> Point {
        self.center + Point::new(-0.5 * self.width, 0.0)
    }

    pub fn northwest(&self) -> Point {
        self.center + Point::new(-0.5 * self.width, -0.5 * self.height)
    }

    pub fn northeast(&self) -> Point {
        self.center + Point::new(0.5 * self.width, -0.5 * self.height)
    }

    pub fn southeast(&self) -> Point {
        self.center + Point::new(0.5 * self.width, 0.5 * self.height)
    }

    pub fn southwest(&self) -> Point {
        self.center + Point::new(-0.5 * self.width, 0.5 * self.height)
    }

    /// Shrinks both extents by `2 * size` around the same center.
    pub fn inset(&self, size: f64) -> Rect {
        let amount = 2.0 * size;
        Rect::new(self.center, self.width - amount, self.height - amount)
    }

    /// Left part of the rectangle, `pos` units wide.
    pub fn split_left(&self, pos: f64) -> Rect {
        Rect::from_top_left(self.northwest(), pos, self.height)
    }

    /// Right part of the rectangle, starting `pos` units from the left edge.
    pub fn split_right(&self, pos: f64) -> Rect {
        let top_left = self.northwest() + Point::new(pos, 0.0);
        Rect::from_top_left(top_left, self.width - pos, self.height)
    }

    /// Top part of the rectangle, `pos` units tall.
    pub fn split_top(&self, pos: f64) -> Rect {
        Rect::from_top_left(self.northwest(), self.width, pos)
    }

    /// Bottom part of the rectangle, starting `pos` units below the top edge.
    pub fn split_bottom(&self, pos: f64) -> Rect {
        let top_left = self.northwest() + Point::new(0.0, pos);
        Rect::from_top_left(top_left, self.width, self.height - pos)
    }

    /// `(left, right)` halves split at an absolute offset from the left edge.
    pub fn split_vertical(&self, pos: f64) -> (Rect, Rect) {
        (self.split_left(pos), self.split_right(pos))
    }

    /// `(top, bottom)` halves split at an absolute offset from the top edge.
    pub fn split_horizontal(&self, pos: f64) -> (Rect, Rect) {
        (self.split_top(pos), self.split_bottom(pos))
    }

    /// Half the shorter side.
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) * 0.5
    }

    pub fn contains(&self, p: Point) -> bool {
        let nw = self.northwest();
        let se = self.southeast();
        p.x >= nw.x.min(se.x) && p.x <= nw.x.max(se.x) && p.y >= nw.y.min(se.y) && p.y <= nw.y.max(se.y)
    }

    /// Same extent, moved so its center is at the origin.
    pub fn local(&self) -> Rect {
        Rect::new(Point::ORIGIN, self.width, self.height)
    }

    /// Guide grid over this rectangle from fractional guide positions.
    pub fn guides(&self, vertical: &[f64], horizontal: &[f64]) -> Guides {
        Guides::new(*self, vertical, horizontal)
    }

    /// Evenly spaced `cols` x `rows` guide grid.
    pub fn grid(&self, cols: usize, rows: usize) -> Guides {
        let fractions = |n: usize| -> Vec<f64> {
            (1..n.max(1)).map(|i| i as f64 / n as f64).collect()
        };
        Guides::new(*self, &fractions(cols), &fractions(rows))
    }

    pub fn approx_eq(&self, other: &Rect) -> bool {
        self.center.approx_eq(&other.center)
            && super::approx_eq(self.width, other.width)
            && super::approx_eq(self.height, other.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {})", self.center, self.width, self.height)
    }
}
