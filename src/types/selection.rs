use serde::{Deserialize, Serialize};

use super::{CellPos, CellRange};

/// Anchor-relative selection rectangle. `start` is where the gesture began,
/// `end` where it currently is; either may be the larger corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: CellPos,
    pub end: CellPos,
}

impl Selection {
    pub fn new(start: CellPos, end: CellPos) -> Self {
        Self { start, end }
    }

    pub fn single(pos: CellPos) -> Self {
        Self { start: pos, end: pos }
    }

    /// Normalized bounds (`r1 <= r2`, `c1 <= c2`).
    pub fn absolute(&self) -> CellRange {
        CellRange::from_corners(self.start, self.end)
    }

    /// Rebuild a selection covering `range` while keeping the gesture's
    /// direction: `start` stays on the side it started on.
    pub fn oriented(&self, range: CellRange) -> Self {
        let (start_row, end_row) = if self.start.row <= self.end.row {
            (range.r1, range.r2)
        } else {
            (range.r2, range.r1)
        };
        let (start_col, end_col) = if self.start.col <= self.end.col {
            (range.c1, range.c2)
        } else {
            (range.c2, range.c1)
        };
        Self {
            start: CellPos::new(start_row, start_col),
            end: CellPos::new(end_row, end_col),
        }
    }

    pub fn covers_row(&self, row: u32) -> bool {
        let r = self.absolute();
        row >= r.r1 && row <= r.r2
    }

    pub fn covers_col(&self, col: u32) -> bool {
        let r = self.absolute();
        col >= r.c1 && col <= r.c2
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
    fn oriented_keeps_drag_direction() {
        let sel = Selection::new(CellPos::new(5, 5), CellPos::new(2, 3));
        let grown = sel.oriented(CellRange { r1: 2, r2: 5, c1: 2, c2: 5 });
        assert_eq!(grown.start, CellPos::new(5, 5));
        assert_eq!(grown.end, CellPos::new(2, 2));
        assert_eq!(grown.absolute(), CellRange { r1: 2, r2: 5, c1: 2, c2: 5 });
    }

    #[test]
    fn covers_rows_and_cols() {
        let sel = Selection::new(CellPos::new(3, 1), CellPos::new(1, 2));
        assert!(sel.covers_row(2));
        assert!(!sel.covers_row(4));
        assert!(sel.covers_col(1));
        assert!(!sel.covers_col(3));
    }
}
