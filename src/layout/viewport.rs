//! Viewport state management for scrolling and zoom.

use crate::types::CellRange;

use super::HeaderSizes;

/// Smallest zoom factor accepted by `set_zoom`.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest zoom factor accepted by `set_zoom`.
pub const MAX_ZOOM: f64 = 4.0;

/// Viewport state - the visible area of the grid.
///
/// Scroll offsets are in zoomed pixels. The coordinate engine never
/// clamps; every mutator here re-clamps so offsets stay within
/// `[0, total_size - viewport_size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll offset
    pub scroll_x: f64,
    /// Vertical scroll offset
    pub scroll_y: f64,
    /// Zoom factor (1.0 = 100%)
    pub zoom: f64,
    /// Container width in logical pixels
    pub width: f64,
    /// Container height in logical pixels
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 1.0,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Largest valid scroll offsets for the given tables.
    pub fn max_scroll(&self, sizes: &HeaderSizes) -> (f64, f64) {
        (
            (sizes.total_width() * self.zoom - self.width).max(0.0),
            (sizes.total_height() * self.zoom - self.height).max(0.0),
        )
    }

    /// Clamp scroll position to `[0, total - viewport]`.
    pub fn clamp_scroll(&mut self, sizes: &HeaderSizes) {
        let (max_x, max_y) = self.max_scroll(sizes);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Scroll by delta amounts. Returns the applied delta.
    pub fn scroll_by(&mut self, delta_x: f64, delta_y: f64, sizes: &HeaderSizes) -> (f64, f64) {
        let (old_x, old_y) = (self.scroll_x, self.scroll_y);
        self.scroll_x += delta_x;
        self.scroll_y += delta_y;
        self.clamp_scroll(sizes);
        (self.scroll_x - old_x, self.scroll_y - old_y)
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, x: f64, y: f64, sizes: &HeaderSizes) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll(sizes);
    }

    /// Resize the container and re-clamp scroll so offsets never go
    /// negative or past the end.
    pub fn resize(&mut self, width: f64, height: f64, sizes: &HeaderSizes) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.clamp_scroll(sizes);
    }

    /// Change zoom, keeping the same content under the top-left corner.
    pub fn set_zoom(&mut self, zoom: f64, sizes: &HeaderSizes) {
        if !zoom.is_finite() {
            return;
        }
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = zoom / self.zoom;
        self.zoom = zoom;
        self.scroll_x *= ratio;
        self.scroll_y *= ratio;
        self.clamp_scroll(sizes);
    }

    /// Scroll the least amount that brings `range` fully into the area not
    /// covered by the frozen headers. A range larger than the viewport is
    /// aligned to its top-left. Returns true when the offsets changed.
    pub fn scroll_into_view(&mut self, sizes: &HeaderSizes, range: CellRange) -> bool {
        let (old_x, old_y) = (self.scroll_x, self.scroll_y);
        let zoom = self.zoom;

        if range.c1 > 0 {
            let frozen = sizes.col_width(0) * zoom;
            let start = sizes.col_position(range.c1) * zoom;
            let end = sizes.col_position(range.c2 + 1) * zoom;
            if start < self.scroll_x + frozen {
                self.scroll_x = start - frozen;
            } else if end > self.scroll_x + self.width {
                self.scroll_x = (end - self.width).min(start - frozen);
            }
        }
        if range.r1 > 0 {
            let frozen = sizes.row_height(0) * zoom;
            let start = sizes.row_position(range.r1) * zoom;
            let end = sizes.row_position(range.r2 + 1) * zoom;
            if start < self.scroll_y + frozen {
                self.scroll_y = start - frozen;
            } else if end > self.scroll_y + self.height {
                self.scroll_y = (end - self.height).min(start - frozen);
            }
        }

        self.clamp_scroll(sizes);
        (self.scroll_x - old_x).abs() > f64::EPSILON || (self.scroll_y - old_y).abs() > f64::EPSILON
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
        // total 40 + 10 * 100 = 1040 wide, 20 + 50 * 20 = 1020 tall
        let mut cols = vec![40.0];
        cols.extend(std::iter::repeat(100.0).take(10));
        let mut rows = vec![20.0];
        rows.extend(std::iter::repeat(20.0).take(50));
        HeaderSizes::from_sizes(cols, rows)
    }

    #[test]
    fn scroll_is_clamped() {
        let s = sizes();
        let mut vp = Viewport::new(400.0, 300.0);
        vp.set_scroll(-50.0, 5000.0, &s);
        assert_eq!(vp.scroll_x, 0.0);
        assert_eq!(vp.scroll_y, 1020.0 - 300.0);
        let applied = vp.scroll_by(10_000.0, 0.0, &s);
        assert_eq!(applied.0, 1040.0 - 400.0);
        assert_eq!(vp.scroll_x, 640.0);
    }

    #[test]
    fn resize_reclamps() {
        let s = sizes();
        let mut vp = Viewport::new(400.0, 300.0);
        vp.set_scroll(640.0, 0.0, &s);
        vp.resize(1000.0, 300.0, &s);
        assert_eq!(vp.scroll_x, 40.0);
        vp.resize(2000.0, 300.0, &s);
        assert_eq!(vp.scroll_x, 0.0);
    }

    #[test]
    fn zoom_scales_scroll_and_clamps_factor() {
        let s = sizes();
        let mut vp = Viewport::new(400.0, 300.0);
        vp.set_scroll(100.0, 100.0, &s);
        vp.set_zoom(2.0, &s);
        assert_eq!(vp.zoom, 2.0);
        assert_eq!(vp.scroll_x, 200.0);
        vp.set_zoom(100.0, &s);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.set_zoom(f64::NAN, &s);
        assert_eq!(vp.zoom, MAX_ZOOM);
    }

    #[test]
    fn scroll_into_view_moves_minimally() {
        let s = sizes();
        let mut vp = Viewport::new(400.0, 300.0);
        // column 5 spans 440..540, right edge past 400
        assert!(vp.scroll_into_view(&s, CellRange { r1: 1, r2: 1, c1: 5, c2: 5 }));
        assert_eq!(vp.scroll_x, 140.0);
        assert!(!vp.scroll_into_view(&s, CellRange { r1: 1, r2: 1, c1: 5, c2: 5 }));
        // column 2 starts at 140, hidden behind the 40px frozen column
        assert!(vp.scroll_into_view(&s, CellRange { r1: 1, r2: 1, c1: 2, c2: 2 }));
        assert_eq!(vp.scroll_x, 100.0);
        // row 30 spans 600..620
        assert!(vp.scroll_into_view(&s, CellRange { r1: 30, r2: 30, c1: 2, c2: 2 }));
        assert_eq!(vp.scroll_y, 320.0);
    }
}
