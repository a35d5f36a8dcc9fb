//! Per-column widths and per-row heights.
//!
//! Sizes are stored unzoomed. Cumulative positions are kept alongside so
//! prefix sums are O(1) lookups; they are rebuilt from the changed index
//! whenever a size changes.

use crate::config::GridConfig;

/// Smallest size a resize drag may produce.
pub const MIN_HEADER_SIZE: f64 = 8.0;

/// Header-size tables. Index 0 of each table is the frozen header.
#[derive(Debug, Clone)]
pub struct HeaderSizes {
    col_widths: Vec<f64>,
    row_heights: Vec<f64>,
    /// `col_positions[i]` = unzoomed x of column i's left edge; one extra
    /// trailing entry holds the total width.
    col_positions: Vec<f64>,
    row_positions: Vec<f64>,
    version: u64,
}

fn prefix_sums(sizes: &[f64]) -> Vec<f64> {
    let mut positions = Vec::with_capacity(sizes.len() + 1);
    let mut acc = 0.0;
    positions.push(acc);
    for size in sizes {
        acc += size;
        positions.push(acc);
    }
    positions
}

fn rebuild_from(positions: &mut [f64], sizes: &[f64], from: usize) {
    let mut acc = positions.get(from).copied().unwrap_or(0.0);
    for (size, pos) in sizes
        .iter()
        .skip(from)
        .zip(positions.iter_mut().skip(from + 1))
    {
        acc += size;
        *pos = acc;
    }
}

impl HeaderSizes {
    /// Uniform tables for a `rows × cols` grid using config defaults.
    pub fn new(rows: u32, cols: u32, config: &GridConfig) -> Self {
        let mut col_widths = vec![config.default_col_width; cols.max(1) as usize];
        let mut row_heights = vec![config.default_row_height; rows.max(1) as usize];
        if let Some(w) = col_widths.first_mut() {
            *w = config.header_col_width;
        }
        if let Some(h) = row_heights.first_mut() {
            *h = config.header_row_height;
        }
        Self::from_sizes(col_widths, row_heights)
    }

    /// Build from explicit tables (index 0 = header).
    pub fn from_sizes(col_widths: Vec<f64>, row_heights: Vec<f64>) -> Self {
        let col_widths: Vec<f64> = col_widths
            .into_iter()
            .map(|w| w.max(MIN_HEADER_SIZE))
            .collect();
        let row_heights: Vec<f64> = row_heights
            .into_iter()
            .map(|h| h.max(MIN_HEADER_SIZE))
            .collect();
        Self {
            col_positions: prefix_sums(&col_widths),
            row_positions: prefix_sums(&row_heights),
            col_widths,
            row_heights,
            version: 0,
        }
    }

    pub fn col_count(&self) -> u32 {
        u32::try_from(self.col_widths.len()).unwrap_or(u32::MAX)
    }

    pub fn row_count(&self) -> u32 {
        u32::try_from(self.row_heights.len()).unwrap_or(u32::MAX)
    }

    /// Bumped whenever any size changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Unzoomed column width; 0 past the end.
    pub fn col_width(&self, col: u32) -> f64 {
        self.col_widths.get(col as usize).copied().unwrap_or(0.0)
    }

    /// Unzoomed row height; 0 past the end.
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights.get(row as usize).copied().unwrap_or(0.0)
    }

    /// Unzoomed sum of widths strictly before `col` (clamped to the total).
    pub fn col_position(&self, col: u32) -> f64 {
        self.col_positions
            .get(col as usize)
            .or_else(|| self.col_positions.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Unzoomed sum of heights strictly before `row` (clamped to the total).
    pub fn row_position(&self, row: u32) -> f64 {
        self.row_positions
            .get(row as usize)
            .or_else(|| self.row_positions.last())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn col_positions(&self) -> &[f64] {
        &self.col_positions
    }

    pub fn row_positions(&self) -> &[f64] {
        &self.row_positions
    }

    pub fn total_width(&self) -> f64 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    pub fn total_height(&self) -> f64 {
        self.row_positions.last().copied().unwrap_or(0.0)
    }

    /// Set a column width (resize drag). Returns false for unknown columns.
    pub fn set_col_width(&mut self, col: u32, width: f64) -> bool {
        let idx = col as usize;
        let Some(slot) = self.col_widths.get_mut(idx) else {
            return false;
        };
        *slot = width.max(MIN_HEADER_SIZE);
        rebuild_from(&mut self.col_positions, &self.col_widths, idx);
        self.version = self.version.wrapping_add(1);
        true
    }

    /// Set a row height (resize drag). Returns false for unknown rows.
    pub fn set_row_height(&mut self, row: u32, height: f64) -> bool {
        let idx = row as usize;
        let Some(slot) = self.row_heights.get_mut(idx) else {
            return false;
        };
        *slot = height.max(MIN_HEADER_SIZE);
        rebuild_from(&mut self.row_positions, &self.row_heights, idx);
        self.version = self.version.wrapping_add(1);
        true
    }

    /// Raise a row to at least `height`. Never shrinks. Returns true when
    /// the row grew.
    pub fn grow_row_height(&mut self, row: u32, height: f64) -> bool {
        if height > self.row_height(row) {
            self.set_row_height(row, height)
        } else {
            false
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

    #[test]
    fn defaults_reserve_header_sizes() {
        let sizes = HeaderSizes::new(5, 4, &GridConfig::default());
        assert_eq!(sizes.col_count(), 4);
        assert_eq!(sizes.row_count(), 5);
        assert_eq!(sizes.col_width(0), 48.0);
        assert_eq!(sizes.col_width(1), 100.0);
        assert_eq!(sizes.row_height(0), 24.0);
        assert_eq!(sizes.total_width(), 48.0 + 300.0);
        assert_eq!(sizes.col_position(2), 148.0);
    }

    #[test]
    fn resize_rebuilds_positions() {
        let mut sizes = HeaderSizes::from_sizes(vec![10.0, 20.0, 30.0], vec![10.0, 10.0]);
        assert!(sizes.set_col_width(1, 50.0));
        assert_eq!(sizes.col_positions(), &[0.0, 10.0, 60.0, 90.0]);
        assert!(!sizes.set_col_width(7, 50.0));
        assert!(sizes.set_col_width(2, 1.0));
        assert_eq!(sizes.col_width(2), MIN_HEADER_SIZE);
    }

    #[test]
    fn grow_never_shrinks() {
        let mut sizes = HeaderSizes::from_sizes(vec![10.0], vec![24.0, 24.0]);
        assert!(!sizes.grow_row_height(1, 12.0));
        assert_eq!(sizes.row_height(1), 24.0);
        assert!(sizes.grow_row_height(1, 40.0));
        assert_eq!(sizes.row_height(1), 40.0);
        assert_eq!(sizes.total_height(), 64.0);
    }

    #[test]
    fn positions_clamp_past_end() {
        let sizes = HeaderSizes::from_sizes(vec![10.0, 10.0], vec![10.0]);
        assert_eq!(sizes.col_position(99), 20.0);
        assert_eq!(sizes.col_width(99), 0.0);
    }
}
