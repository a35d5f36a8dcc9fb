//! Coordinate engine: header-size tables + viewport → pixel space.
//!
//! Index 0 on each axis is the frozen header and always sits at pixel 0.
//! Every other index is offset by its zoomed prefix sum minus the scroll
//! offset. Inverse lookups scan the cached prefix sums.

use std::ops::Range;

use crate::merge;
use crate::types::{CellPos, CellRange, Grid};

use super::{HeaderSizes, Viewport};

/// Pixel rectangle in viewport (logical pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CellRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Borrowed view combining the size tables with the viewport.
#[derive(Clone, Copy)]
pub struct GridGeometry<'a> {
    pub sizes: &'a HeaderSizes,
    pub viewport: &'a Viewport,
}

/// Smallest `[start, end)` window over `positions` (unzoomed prefix sums,
/// one trailing total) such that the prefix before `start` is at most
/// `offset` and the sizes from `start` first exceed `extent` at `end`.
fn visible_range(positions: &[f64], zoom: f64, offset: f64, extent: f64) -> Range<u32> {
    let count = positions.len().saturating_sub(1);
    if count == 0 {
        return 0..0;
    }
    let edges = positions.get(1..).unwrap_or(&[]);
    let start = edges.partition_point(|p| p * zoom <= offset).min(count - 1);
    let origin = positions.get(start).copied().unwrap_or(0.0) * zoom;
    let after = positions.get(start + 1..).unwrap_or(&[]);
    let fitting = after.partition_point(|p| p * zoom - origin <= extent);
    let end = (start + 1 + fitting).min(count);
    let to_u32 = |v: usize| u32::try_from(v).unwrap_or(u32::MAX);
    to_u32(start)..to_u32(end)
}

/// Index whose zoomed span contains `pos` in content space.
fn index_at(positions: &[f64], zoom: f64, pos: f64) -> Option<u32> {
    if pos < 0.0 {
        return None;
    }
    let count = positions.len().saturating_sub(1);
    let edges = positions.get(1..).unwrap_or(&[]);
    let idx = edges.partition_point(|p| p * zoom <= pos);
    if idx >= count {
        return None;
    }
    u32::try_from(idx).ok()
}

impl<'a> GridGeometry<'a> {
    pub fn new(sizes: &'a HeaderSizes, viewport: &'a Viewport) -> Self {
        Self { sizes, viewport }
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    /// Zoomed column width.
    pub fn col_width(&self, col: u32) -> f64 {
        self.sizes.col_width(col) * self.viewport.zoom
    }

    /// Zoomed row height.
    pub fn row_height(&self, row: u32) -> f64 {
        self.sizes.row_height(row) * self.viewport.zoom
    }

    /// Visible row interval `[start, end)`. May include row 0 when the
    /// scroll offset is small; callers drawing the scrollable pane skip it.
    pub fn visible_rows(&self) -> Range<u32> {
        visible_range(
            self.sizes.row_positions(),
            self.viewport.zoom,
            self.viewport.scroll_y,
            self.viewport.height,
        )
    }

    /// Visible column interval `[start, end)`.
    pub fn visible_cols(&self) -> Range<u32> {
        visible_range(
            self.sizes.col_positions(),
            self.viewport.zoom,
            self.viewport.scroll_x,
            self.viewport.width,
        )
    }

    /// X of a column's left edge. Column 0 is pinned at 0.
    pub fn left(&self, col: u32) -> f64 {
        if col == 0 {
            return 0.0;
        }
        self.sizes.col_position(col) * self.viewport.zoom - self.viewport.scroll_x
    }

    /// Y of a row's top edge. Row 0 is pinned at 0.
    pub fn top(&self, row: u32) -> f64 {
        if row == 0 {
            return 0.0;
        }
        self.sizes.row_position(row) * self.viewport.zoom - self.viewport.scroll_y
    }

    /// Width of the frozen header column in pixels.
    pub fn frozen_width(&self) -> f64 {
        self.col_width(0)
    }

    /// Height of the frozen header row in pixels.
    pub fn frozen_height(&self) -> f64 {
        self.row_height(0)
    }

    /// Column under viewport x. The frozen column wins inside its band.
    pub fn col_at_x(&self, x: f64) -> Option<u32> {
        if x < 0.0 {
            return None;
        }
        if x < self.frozen_width() {
            return Some(0);
        }
        index_at(
            self.sizes.col_positions(),
            self.viewport.zoom,
            x + self.viewport.scroll_x,
        )
    }

    /// Row under viewport y. The frozen row wins inside its band.
    pub fn row_at_y(&self, y: f64) -> Option<u32> {
        if y < 0.0 {
            return None;
        }
        if y < self.frozen_height() {
            return Some(0);
        }
        index_at(
            self.sizes.row_positions(),
            self.viewport.zoom,
            y + self.viewport.scroll_y,
        )
    }

    /// Zoomed `(width, height)` of the cell's footprint: the whole merge
    /// span when merged, otherwise the plain cell.
    pub fn merge_footprint(&self, grid: &Grid, pos: CellPos) -> (f64, f64) {
        let span = merge::footprint_rect(grid, pos);
        let zoom = self.viewport.zoom;
        let width =
            (self.sizes.col_position(span.c2 + 1) - self.sizes.col_position(span.c1)) * zoom;
        let height =
            (self.sizes.row_position(span.r2 + 1) - self.sizes.row_position(span.r1)) * zoom;
        (width, height)
    }

    /// Pixel origin of the cell, resolved to its merge anchor first.
    pub fn effective_position(&self, grid: &Grid, pos: CellPos) -> (f64, f64) {
        let anchor = merge::resolve_anchor(grid, pos);
        (self.left(anchor.col), self.top(anchor.row))
    }

    /// Full on-screen rectangle of the cell (merge-resolved).
    pub fn cell_rect(&self, grid: &Grid, pos: CellPos) -> CellRect {
        let (x, y) = self.effective_position(grid, pos);
        let (width, height) = self.merge_footprint(grid, pos);
        CellRect {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole cell range (no merge resolution).
    pub fn range_rect(&self, range: CellRange) -> CellRect {
        let x = self.left(range.c1);
        let y = self.top(range.r1);
        CellRect {
            x,
            y,
            width: self.left(range.c2) + self.col_width(range.c2) - x,
            height: self.top(range.r2) + self.row_height(range.r2) - y,
        }
    }

    /// Rectangle of the plain cell, ignoring merges.
    pub fn raw_cell_rect(&self, pos: CellPos) -> CellRect {
        CellRect {
            x: self.left(pos.col),
            y: self.top(pos.row),
            width: self.col_width(pos.col),
            height: self.row_height(pos.row),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn sizes() -> HeaderSizes {
        HeaderSizes::from_sizes(vec![40.0, 100.0, 100.0, 100.0, 100.0], vec![20.0; 30])
    }

    #[test]
    fn frozen_index_pinned() {
        let s = sizes();
        let mut vp = Viewport::new(300.0, 200.0);
        vp.scroll_x = 150.0;
        vp.scroll_y = 77.0;
        let g = GridGeometry::new(&s, &vp);
        assert_eq!(g.left(0), 0.0);
        assert_eq!(g.top(0), 0.0);
        assert_eq!(g.left(1), 40.0 - 150.0);
        assert_eq!(g.top(2), 40.0 - 77.0);
    }

    #[test]
    fn visible_range_at_origin() {
        let s = sizes();
        let vp = Viewport::new(250.0, 100.0);
        let g = GridGeometry::new(&s, &vp);
        // 40 + 100 + 100 = 240 <= 250, the 4th column crosses the edge
        assert_eq!(g.visible_cols(), 0..4);
        // 5 rows * 20 = 100 <= 100, the 6th row exceeds
        assert_eq!(g.visible_rows(), 0..6);
    }

    #[test]
    fn visible_range_clamps_to_table() {
        let s = sizes();
        let mut vp = Viewport::new(10_000.0, 100.0);
        vp.scroll_x = 0.0;
        let g = GridGeometry::new(&s, &vp);
        assert_eq!(g.visible_cols(), 0..5);
    }

    #[test]
    fn visible_range_after_scroll() {
        let s = sizes();
        let mut vp = Viewport::new(150.0, 100.0);
        vp.scroll_x = 145.0;
        let g = GridGeometry::new(&s, &vp);
        // column 2 spans 140..240 and contains the scroll offset
        assert_eq!(g.visible_cols().start, 2);
    }

    #[test]
    fn hit_testing_respects_frozen_bands() {
        let s = sizes();
        let mut vp = Viewport::new(300.0, 200.0);
        vp.scroll_x = 100.0;
        let g = GridGeometry::new(&s, &vp);
        assert_eq!(g.col_at_x(10.0), Some(0));
        // x=45 -> content 145 -> column 2 (140..240)
        assert_eq!(g.col_at_x(45.0), Some(2));
        assert_eq!(g.col_at_x(5000.0), None);
        assert_eq!(g.row_at_y(5.0), Some(0));
        assert_eq!(g.row_at_y(25.0), Some(1));
        assert_eq!(g.col_at_x(-1.0), None);
    }

    #[test]
    fn merged_cells_report_anchor_origin_and_span() {
        let s = sizes();
        let vp = Viewport::new(500.0, 300.0);
        let g = GridGeometry::new(&s, &vp);
        let mut grid = Grid::new(30, 5);
        grid.merge(CellRange { r1: 2, r2: 3, c1: 2, c2: 4 }).unwrap();

        let child = g.cell_rect(&grid, CellPos::new(3, 3));
        let anchor = g.cell_rect(&grid, CellPos::new(2, 2));
        assert_eq!(child, anchor);
        assert_eq!(anchor.x, 140.0);
        assert_eq!(anchor.y, 40.0);
        assert_eq!(anchor.width, 300.0);
        assert_eq!(anchor.height, 40.0);

        let plain = g.cell_rect(&grid, CellPos::new(5, 1));
        assert_eq!(plain.width, 100.0);
        assert_eq!(plain.height, 20.0);
    }

    #[test]
    fn range_rect_spans_columns_and_rows() {
        let s = sizes();
        let vp = Viewport::new(500.0, 300.0);
        let g = GridGeometry::new(&s, &vp);
        let r = g.range_rect(CellRange { r1: 1, r2: 3, c1: 1, c2: 2 });
        assert_eq!((r.x, r.y, r.width, r.height), (40.0, 20.0, 200.0, 60.0));
    }

    #[test]
    fn zoom_scales_everything() {
        let s = sizes();
        let mut vp = Viewport::new(500.0, 300.0);
        vp.zoom = 2.0;
        let g = GridGeometry::new(&s, &vp);
        assert_eq!(g.left(2), 280.0);
        assert_eq!(g.col_width(1), 200.0);
        assert_eq!(g.frozen_height(), 40.0);
    }
}
