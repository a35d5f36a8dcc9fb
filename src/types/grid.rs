//! Row-major cell matrix owned by one grid instance.
//!
//! Every mutation goes through an explicit `(row, col)` update so the
//! renderer always sees a consistent snapshot between frames. A version
//! counter lets derived caches (overflow map) notice data changes.

use crate::error::{Result, SheetError};

use super::{Cell, CellPos, CellRange, CellStyle, Merge};

/// The cell matrix, including the frozen header row 0 and column 0.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
    version: u64,
}

/// Convert a 0-based data column index to spreadsheet letters
/// (0 → A, 25 → Z, 26 → AA).
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        let c = char::from_digit(n % 26 + 10, 36)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?');
        result.insert(0, c);
        n /= 26;
    }
    result
}

impl Grid {
    /// Create a `rows × cols` grid (headers included). Row 0 gets column
    /// letters and column 0 gets 1-based row numbers; both are read-only.
    pub fn new(rows: u32, cols: u32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let mut cell = Cell::new(row, col);
                if row == 0 || col == 0 {
                    cell.read_only = true;
                    if row == 0 && col > 0 {
                        cell.value = col_to_letter(col - 1);
                    } else if col == 0 && row > 0 {
                        cell.value = row.to_string();
                    }
                }
                cells.push(cell);
            }
        }
        Self {
            rows,
            cols,
            cells,
            version: 0,
        }
    }

    /// Number of rows including the header row.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns including the header column.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Monotonic counter bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The data region (everything except the frozen headers), or `None`
    /// for a grid that only has headers.
    pub fn data_range(&self) -> Option<CellRange> {
        (self.rows > 1 && self.cols > 1).then(|| CellRange {
            r1: 1,
            r2: self.rows - 1,
            c1: 1,
            c2: self.cols - 1,
        })
    }

    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        self.index(pos).and_then(|i| self.cells.get(i))
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.get(CellPos::new(row, col))
    }

    /// Value of a cell, empty for out-of-range lookups.
    pub fn value(&self, pos: CellPos) -> &str {
        self.get(pos).map(|c| c.value.as_str()).unwrap_or("")
    }

    /// Apply `f` to the cell at `pos`. Returns false (and does nothing)
    /// when the cell does not exist.
    pub fn update_cell<F>(&mut self, pos: CellPos, f: F) -> bool
    where
        F: FnOnce(&mut Cell),
    {
        let Some(i) = self.index(pos) else {
            return false;
        };
        let Some(cell) = self.cells.get_mut(i) else {
            return false;
        };
        f(cell);
        self.version = self.version.wrapping_add(1);
        true
    }

    pub fn set_value(&mut self, pos: CellPos, value: &str) -> bool {
        self.update_cell(pos, |cell| {
            cell.value.clear();
            cell.value.push_str(value);
        })
    }

    pub fn set_style(&mut self, pos: CellPos, style: CellStyle) -> bool {
        self.update_cell(pos, |cell| cell.style = style)
    }

    /// Clear values in `range`, skipping read-only cells. Returns how many
    /// cells changed.
    pub fn clear_values(&mut self, range: CellRange) -> usize {
        let mut cleared = 0;
        for pos in range.positions() {
            let editable = self
                .get(pos)
                .is_some_and(|c| !c.read_only && !c.value.is_empty());
            if editable && self.update_cell(pos, |c| c.value.clear()) {
                cleared += 1;
            }
        }
        cleared
    }

    /// Merge `range` into one region anchored at its top-left cell.
    /// Corners may be given in any order.
    ///
    /// Rejects single-cell ranges, ranges touching the frozen headers or
    /// leaving the grid, and ranges overlapping an existing merge.
    pub fn merge(&mut self, range: CellRange) -> Result<()> {
        let range = range.normalized();
        if range.is_single_cell() {
            return Err(SheetError::InvalidMerge("range covers a single cell".into()));
        }
        if range.r1 == 0 || range.c1 == 0 {
            return Err(SheetError::InvalidMerge(
                "range includes a header row or column".into(),
            ));
        }
        if range.r2 >= self.rows || range.c2 >= self.cols {
            return Err(SheetError::OutOfRange {
                row: range.r2,
                col: range.c2,
            });
        }
        for pos in range.positions() {
            if let Some(existing) = self.get(pos).and_then(|c| c.merge) {
                let anchor = match existing {
                    Merge::Anchor(_) => pos,
                    Merge::Child(anchor) => anchor,
                };
                return Err(SheetError::MergeOverlap {
                    anchor_row: anchor.row,
                    anchor_col: anchor.col,
                });
            }
        }

        let anchor = range.top_left();
        for pos in range.positions() {
            let merge = if pos == anchor {
                Merge::Anchor(range)
            } else {
                Merge::Child(anchor)
            };
            self.update_cell(pos, |c| c.merge = Some(merge));
        }
        log::debug!(
            "merged rows {}..={} cols {}..={}",
            range.r1,
            range.r2,
            range.c1,
            range.c2
        );
        Ok(())
    }

    /// Dissolve the merge containing `pos`. Returns the former span.
    pub fn unmerge(&mut self, pos: CellPos) -> Result<CellRange> {
        let cell = self.get(pos).ok_or(SheetError::OutOfRange {
            row: pos.row,
            col: pos.col,
        })?;
        let anchor = match cell.merge {
            Some(Merge::Anchor(_)) => pos,
            Some(Merge::Child(anchor)) => anchor,
            None => {
                return Err(SheetError::InvalidMerge(format!(
                    "cell ({}, {}) is not merged",
                    pos.row, pos.col
                )))
            }
        };
        let span = self
            .get(anchor)
            .and_then(Cell::merge_span)
            .ok_or_else(|| SheetError::InvalidMerge("dangling merge reference".into()))?;
        for p in span.positions() {
            self.update_cell(p, |c| c.merge = None);
        }
        Ok(span)
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
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
    fn col_letters() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(27), "AB");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
    }

    #[test]
    fn new_grid_has_read_only_headers() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.value(CellPos::new(0, 1)), "A");
        assert_eq!(grid.value(CellPos::new(0, 2)), "B");
        assert_eq!(grid.value(CellPos::new(3, 0)), "3");
        assert_eq!(grid.value(CellPos::new(0, 0)), "");
        assert!(grid.cell(0, 2).unwrap().read_only);
        assert!(!grid.cell(1, 1).unwrap().read_only);
        assert_eq!(
            grid.data_range(),
            Some(CellRange { r1: 1, r2: 3, c1: 1, c2: 2 })
        );
    }

    #[test]
    fn out_of_range_updates_are_noops() {
        let mut grid = Grid::new(3, 3);
        let before = grid.version();
        assert!(!grid.set_value(CellPos::new(9, 9), "x"));
        assert_eq!(grid.version(), before);
        assert!(grid.set_value(CellPos::new(1, 1), "x"));
        assert!(grid.version() > before);
    }

    #[test]
    fn merge_sets_back_references() {
        let mut grid = Grid::new(6, 6);
        let span = CellRange { r1: 2, r2: 3, c1: 2, c2: 4 };
        grid.merge(span).unwrap();
        assert_eq!(grid.cell(2, 2).unwrap().merge_span(), Some(span));
        for pos in span.positions().filter(|p| *p != CellPos::new(2, 2)) {
            assert_eq!(grid.get(pos).unwrap().merge_parent(), Some(CellPos::new(2, 2)));
        }
        assert!(grid.cell(4, 4).unwrap().merge.is_none());
    }

    #[test]
    fn merge_rejects_overlap_and_headers() {
        let mut grid = Grid::new(6, 6);
        grid.merge(CellRange { r1: 2, r2: 2, c1: 2, c2: 4 }).unwrap();
        let err = grid
            .merge(CellRange { r1: 1, r2: 2, c1: 4, c2: 5 })
            .unwrap_err();
        assert!(matches!(
            err,
            SheetError::MergeOverlap { anchor_row: 2, anchor_col: 2 }
        ));
        assert!(grid.merge(CellRange { r1: 0, r2: 1, c1: 1, c2: 1 }).is_err());
        assert!(grid.merge(CellRange { r1: 1, r2: 1, c1: 1, c2: 1 }).is_err());
        assert!(grid.merge(CellRange { r1: 1, r2: 9, c1: 1, c2: 1 }).is_err());
    }

    #[test]
    fn merge_accepts_corners_in_any_order() {
        let mut grid = Grid::new(10, 6);
        grid.merge(CellRange { r1: 4, r2: 2, c1: 3, c2: 1 }).unwrap();
        let span = CellRange { r1: 2, r2: 4, c1: 1, c2: 3 };
        assert_eq!(grid.cell(2, 1).unwrap().merge_span(), Some(span));
        assert_eq!(grid.cell(4, 3).unwrap().merge_parent(), Some(CellPos::new(2, 1)));
        assert_eq!((span.row_count(), span.col_count()), (3, 3));

        // inverted ranges still hit the header and bounds checks
        assert!(grid.merge(CellRange { r1: 6, r2: 0, c1: 4, c2: 5 }).is_err());
        assert!(grid.merge(CellRange { r1: 12, r2: 6, c1: 5, c2: 4 }).is_err());
        assert!(grid.merge(CellRange { r1: 5, r2: 3, c1: 2, c2: 2 }).is_err());
        assert_eq!(grid.unmerge(CellPos::new(3, 2)).unwrap(), span);
    }

    #[test]
    fn unmerge_from_child_clears_region() {
        let mut grid = Grid::new(6, 6);
        let span = CellRange { r1: 2, r2: 3, c1: 2, c2: 3 };
        grid.merge(span).unwrap();
        assert_eq!(grid.unmerge(CellPos::new(3, 3)).unwrap(), span);
        assert!(span.positions().all(|p| grid.get(p).unwrap().merge.is_none()));
        assert!(grid.unmerge(CellPos::new(3, 3)).is_err());
    }

    #[test]
    fn clear_values_skips_read_only() {
        let mut grid = Grid::new(3, 3);
        grid.set_value(CellPos::new(1, 1), "a");
        grid.set_value(CellPos::new(2, 2), "b");
        let cleared = grid.clear_values(CellRange { r1: 0, r2: 2, c1: 0, c2: 2 });
        assert_eq!(cleared, 2);
        assert_eq!(grid.value(CellPos::new(0, 1)), "A");
        assert_eq!(grid.value(CellPos::new(1, 1)), "");
    }
}
