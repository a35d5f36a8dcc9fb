use serde::{Deserialize, Serialize};

use super::CellStyle;

/// Grid coordinate `(row, col)`, both 0-based. Row 0 and column 0 are the
/// frozen headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u32,
    pub col: u32,
}

impl CellPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// True for cells in the frozen header row or column.
    pub const fn is_header(self) -> bool {
        self.row == 0 || self.col == 0
    }
}

impl From<(u32, u32)> for CellPos {
    fn from((row, col): (u32, u32)) -> Self {
        Self { row, col }
    }
}

/// Absolute (normalized) rectangle of cells, inclusive on both ends:
/// `r1 <= r2`, `c1 <= c2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub r1: u32,
    pub r2: u32,
    pub c1: u32,
    pub c2: u32,
}

impl CellRange {
    /// Build a normalized range from two corners given in any order.
    pub fn from_corners(a: CellPos, b: CellPos) -> Self {
        Self {
            r1: a.row.min(b.row),
            r2: a.row.max(b.row),
            c1: a.col.min(b.col),
            c2: a.col.max(b.col),
        }
    }

    pub fn single(pos: CellPos) -> Self {
        Self::from_corners(pos, pos)
    }

    /// Same cells with the corners swapped into `r1 <= r2`, `c1 <= c2`.
    pub fn normalized(&self) -> Self {
        Self::from_corners(
            CellPos::new(self.r1, self.c1),
            CellPos::new(self.r2, self.c2),
        )
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row >= self.r1 && pos.row <= self.r2 && pos.col >= self.c1 && pos.col <= self.c2
    }

    /// True when `other` lies entirely inside `self`.
    pub fn encloses(&self, other: &CellRange) -> bool {
        other.r1 >= self.r1 && other.r2 <= self.r2 && other.c1 >= self.c1 && other.c2 <= self.c2
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.r1 <= other.r2 && other.r1 <= self.r2 && self.c1 <= other.c2 && other.c1 <= self.c2
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &CellRange) -> Self {
        Self {
            r1: self.r1.min(other.r1),
            r2: self.r2.max(other.r2),
            c1: self.c1.min(other.c1),
            c2: self.c2.max(other.c2),
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.r1 == self.r2 && self.c1 == self.c2
    }

    pub fn top_left(&self) -> CellPos {
        CellPos::new(self.r1, self.c1)
    }

    pub fn row_count(&self) -> u32 {
        self.r1.abs_diff(self.r2) + 1
    }

    pub fn col_count(&self) -> u32 {
        self.c1.abs_diff(self.c2) + 1
    }

    /// Iterate every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = CellPos> {
        let (c1, c2) = (self.c1, self.c2);
        (self.r1..=self.r2).flat_map(move |row| (c1..=c2).map(move |col| CellPos::new(row, col)))
    }
}

/// Merge membership of a cell.
///
/// The anchor owns the span; every other cell in the span points back to
/// the anchor by coordinate. Holding this in one enum keeps a cell from
/// being both an anchor and a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Merge {
    /// This cell anchors the merge and owns its rectangle.
    Anchor(CellRange),
    /// This cell belongs to the merge anchored at the given coordinate.
    Child(CellPos),
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: String,
    #[serde(default)]
    pub style: CellStyle,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<Merge>,
}

impl Cell {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            value: String::new(),
            style: CellStyle::default(),
            read_only: false,
            merge: None,
        }
    }

    pub fn pos(&self) -> CellPos {
        CellPos::new(self.row, self.col)
    }

    /// The owned merge rectangle when this cell is an anchor.
    pub fn merge_span(&self) -> Option<CellRange> {
        match self.merge {
            Some(Merge::Anchor(span)) => Some(span),
            _ => None,
        }
    }

    /// The anchor coordinate when this cell is a merge child.
    pub fn merge_parent(&self) -> Option<CellPos> {
        match self.merge {
            Some(Merge::Child(anchor)) => Some(anchor),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Reset value, style and merge fields. Cells are never destroyed.
    pub fn reset(&mut self) {
        self.value.clear();
        self.style = CellStyle::default();
        self.merge = None;
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
    fn range_normalizes_corners() {
        let r = CellRange::from_corners(CellPos::new(5, 5), CellPos::new(2, 3));
        assert_eq!(r, CellRange { r1: 2, r2: 5, c1: 3, c2: 5 });
        assert_eq!(r.row_count(), 4);
        assert_eq!(r.col_count(), 3);
        assert!(r.contains(CellPos::new(3, 4)));
        assert!(!r.contains(CellPos::new(1, 4)));
    }

    #[test]
    fn range_positions_are_row_major() {
        let r = CellRange { r1: 1, r2: 2, c1: 1, c2: 2 };
        let all: Vec<_> = r.positions().collect();
        assert_eq!(
            all,
            vec![
                CellPos::new(1, 1),
                CellPos::new(1, 2),
                CellPos::new(2, 1),
                CellPos::new(2, 2)
            ]
        );
    }

    #[test]
    fn merge_accessors_are_exclusive() {
        let mut cell = Cell::new(2, 2);
        assert!(cell.merge_span().is_none() && cell.merge_parent().is_none());
        cell.merge = Some(Merge::Anchor(CellRange { r1: 2, r2: 2, c1: 2, c2: 4 }));
        assert!(cell.merge_span().is_some() && cell.merge_parent().is_none());
        cell.merge = Some(Merge::Child(CellPos::new(1, 1)));
        assert!(cell.merge_span().is_none() && cell.merge_parent().is_some());
    }
}
