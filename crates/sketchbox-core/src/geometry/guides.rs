use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// A grid of guide lines laid over a rectangle.
///
/// Guide fractions are clamped into `[0, 1]`, non-finite fractions are
/// dropped, and the remaining ones are sorted. The stored positions are
/// absolute coordinates and always include both boundaries, so with `N`
/// guides the valid line indices are `0..=N + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guides {
    bounds: Rect,
    vertical: Vec<f64>,
    horizontal: Vec<f64>,
}

fn positions(origin: f64, extent: f64, fractions: &[f64]) -> Vec<f64> {
    let mut inner: Vec<f64> = fractions
        .iter()
        .copied()
        .filter(|f| f.is_finite())
        .map(|f| f.clamp(0.0, 1.0))
        .collect();
    inner.sort_by(f64::total_cmp);

    let mut out = Vec::with_capacity(inner.len() + 2);
    out.push(origin);
    out.extend(inner.into_iter().map(|f| origin + f * extent));
    out.push(origin + extent);
    out
}

impl Guides {
    pub fn new(bounds: Rect, vertical: &[f64], horizontal: &[f64]) -> Self {
        let nw = bounds.northwest();
        Self {
            bounds,
            vertical: positions(nw.x, bounds.width, vertical),
            horizontal: positions(nw.y, bounds.height, horizontal),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// x coordinates of the vertical guide lines, boundaries included.
    pub fn vertical(&self) -> &[f64] {
        &self.vertical
    }

    /// y coordinates of the horizontal guide lines, boundaries included.
    pub fn horizontal(&self) -> &[f64] {
        &self.horizontal
    }

    /// Number of cell columns.
    pub fn columns(&self) -> usize {
        self.vertical.len() - 1
    }

    /// Number of cell rows.
    pub fn rows(&self) -> usize {
        self.horizontal.len() - 1
    }

    /// Crossing of the `col`-th vertical and `row`-th horizontal line.
    pub fn intersection(&self, col: usize, row: usize) -> Option<Point> {
        Some(Point::new(*self.vertical.get(col)?, *self.horizontal.get(row)?))
    }

    /// Rectangle between intersection `(col, row)` and `(col + 1, row + 1)`.
    pub fn cell(&self, col: usize, row: usize) -> Option<Rect> {
        let a = self.intersection(col, row)?;
        let b = self.intersection(col + 1, row + 1)?;
        Some(Rect::from_top_left(a, b.x - a.x, b.y - a.y))
    }

    /// Full-width band between horizontal lines `i` and `i + 1`.
    pub fn row(&self, i: usize) -> Option<Rect> {
        let top = *self.horizontal.get(i)?;
        let bottom = *self.horizontal.get(i + 1)?;
        let left = self.vertical[0];
        let width = self.vertical[self.vertical.len() - 1] - left;
        Some(Rect::from_top_left(Point::new(left, top), width, bottom - top))
    }

    /// Full-height band between vertical lines `i` and `i + 1`.
    pub fn column(&self, i: usize) -> Option<Rect> {
        let left = *self.vertical.get(i)?;
        let right = *self.vertical.get(i + 1)?;
        let top = self.horizontal[0];
        let height = self.horizontal[self.horizontal.len() - 1] - top;
        Some(Rect::from_top_left(Point::new(left, top), right - left, height))
    }

    /// Every cell, walking down each column first when `column_first`,
    /// otherwise across each row first.
    pub fn cells(&self, column_first: bool) -> Vec<Rect> {
        let mut out = Vec::with_capacity(self.columns() * self.rows());
        if column_first {
            for col in 0..self.columns() {
                out.extend((0..self.rows()).filter_map(|row| self.cell(col, row)));
            }
        } else {
            for row in 0..self.rows() {
                out.extend((0..self.columns()).filter_map(|col| self.cell(col, row)));
            }
        }
        out
    }

    /// Line segments for every guide, boundaries included.
    pub fn lines(&self) -> Vec<(Point, Point)> {
        let top = self.horizontal[0];
        let bottom = self.horizontal[self.horizontal.len() - 1];
        let left = self.vertical[0];
        let right = self.vertical[self.vertical.len() - 1];

        let verticals = self
            .vertical
            .iter()
            .map(|&x| (Point::new(x, top), Point::new(x, bottom)));
        let horizontals = self
            .horizontal
            .iter()
            .map(|&y| (Point::new(left, y), Point::new(right, y)));
        verticals.chain(horizontals).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Rect {
        Rect::from_top_left(Point::ORIGIN, 100.0, 100.0)
    }

    #[test]
    fn test_out_of_range_fractions_are_clamped() {
        let g = square().guides(&[1.5, -0.25, f64::NAN], &[]);
        assert_eq!(g.vertical(), &[0.0, 0.0, 100.0, 100.0]);
        assert_eq!(g.horizontal(), &[0.0, 100.0]);
    }

    #[test]
    fn test_unsorted_fractions() {
        let g = square().guides(&[0.75, 0.25], &[]);
        assert_eq!(g.vertical(), &[0.0, 25.0, 75.0, 100.0]);
    }

    #[test]
    fn test_out_of_bounds_index() {
        let g = square().guides(&[0.5], &[0.5]);
        assert!(g.intersection(2, 2).is_some());
        assert!(g.intersection(3, 0).is_none());
        assert!(g.cell(2, 0).is_none());
        assert!(g.row(2).is_none());
    }

    #[test]
    fn test_cells_order() {
        let g = square().grid(2, 2);
        let by_col = g.cells(true);
        let by_row = g.cells(false);
        assert_eq!(by_col.len(), 4);
        assert_eq!(by_col[1], by_row[2]);
        assert_eq!(by_col[0], by_row[0]);
    }

    #[test]
    fn test_lines_count() {
        let g = square().guides(&[0.5], &[0.25, 0.75]);
        assert_eq!(g.lines().len(), 3 + 4);
    }
}
