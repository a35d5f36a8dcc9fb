//! Merge model: read-only queries over the merge fields of the grid.
//!
//! A child's back-reference always names the literal anchor, so anchor
//! resolution is a single hop. Merge and unmerge themselves live on
//! [`Grid`]; this module never mutates.

use std::collections::HashSet;

use crate::error::{Result, SheetError};
use crate::types::{Cell, CellPos, CellRange, Grid, Merge};

/// Coordinate of the cell that owns `pos`'s merge region, or `pos` itself
/// for standalone cells.
pub fn resolve_anchor(grid: &Grid, pos: CellPos) -> CellPos {
    match grid.get(pos).and_then(|c| c.merge) {
        Some(Merge::Child(anchor)) => anchor,
        _ => pos,
    }
}

/// The anchor cell itself. `None` only when `pos` is out of range.
pub fn anchor_cell(grid: &Grid, pos: CellPos) -> Option<&Cell> {
    grid.get(resolve_anchor(grid, pos))
}

/// True when the cell anchors or belongs to a merge region.
pub fn is_effectively_merged(grid: &Grid, pos: CellPos) -> bool {
    grid.get(pos).is_some_and(|c| c.merge.is_some())
}

/// True when the cell is a non-anchor member of a merge region.
pub fn is_merge_child(grid: &Grid, pos: CellPos) -> bool {
    grid.get(pos).and_then(Cell::merge_parent).is_some()
}

/// Rectangle the cell occupies: its merge span when merged, otherwise
/// the single cell.
pub fn footprint_rect(grid: &Grid, pos: CellPos) -> CellRange {
    anchor_cell(grid, pos)
        .and_then(Cell::merge_span)
        .unwrap_or_else(|| CellRange::single(pos))
}

/// Check the merge invariants over the whole grid:
/// - an anchor's span starts at the anchor and stays inside the grid,
/// - every other cell in the span points back to that anchor,
/// - every child points at an anchor whose span contains it,
/// - no cell belongs to two regions.
pub fn validate(grid: &Grid) -> Result<()> {
    let mut claimed: HashSet<CellPos> = HashSet::new();
    for cell in grid.iter() {
        let pos = cell.pos();
        match cell.merge {
            Some(Merge::Anchor(span)) => {
                if span.top_left() != pos || !grid.in_bounds(CellPos::new(span.r2, span.c2)) {
                    return Err(SheetError::InvalidMerge(format!(
                        "anchor ({}, {}) owns a span that does not start at it or leaves the grid",
                        pos.row, pos.col
                    )));
                }
                for member in span.positions() {
                    if !claimed.insert(member) {
                        return Err(SheetError::MergeOverlap {
                            anchor_row: pos.row,
                            anchor_col: pos.col,
                        });
                    }
                    if member != pos && grid.get(member).and_then(Cell::merge_parent) != Some(pos)
                    {
                        return Err(SheetError::InvalidMerge(format!(
                            "cell ({}, {}) inside span of ({}, {}) does not point back",
                            member.row, member.col, pos.row, pos.col
                        )));
                    }
                }
            }
            Some(Merge::Child(anchor)) => {
                let contains = grid
                    .get(anchor)
                    .and_then(Cell::merge_span)
                    .is_some_and(|span| span.contains(pos));
                if !contains {
                    return Err(SheetError::InvalidMerge(format!(
                        "cell ({}, {}) points at ({}, {}) which does not own it",
                        pos.row, pos.col, anchor.row, anchor.col
                    )));
                }
            }
            None => {}
        }
    }
    Ok(())
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

    fn merged_grid() -> Grid {
        let mut grid = Grid::new(8, 8);
        grid.merge(CellRange { r1: 2, r2: 2, c1: 2, c2: 4 }).unwrap();
        grid.merge(CellRange { r1: 4, r2: 6, c1: 1, c2: 2 }).unwrap();
        grid
    }

    #[test]
    fn anchor_resolution_is_one_hop() {
        let grid = merged_grid();
        assert_eq!(resolve_anchor(&grid, CellPos::new(2, 4)), CellPos::new(2, 2));
        assert_eq!(resolve_anchor(&grid, CellPos::new(2, 2)), CellPos::new(2, 2));
        assert_eq!(resolve_anchor(&grid, CellPos::new(3, 3)), CellPos::new(3, 3));
        assert_eq!(anchor_cell(&grid, CellPos::new(6, 2)).unwrap().pos(), CellPos::new(4, 1));
    }

    #[test]
    fn footprint_covers_span_or_single_cell() {
        let grid = merged_grid();
        assert_eq!(
            footprint_rect(&grid, CellPos::new(5, 2)),
            CellRange { r1: 4, r2: 6, c1: 1, c2: 2 }
        );
        assert_eq!(
            footprint_rect(&grid, CellPos::new(1, 1)),
            CellRange::single(CellPos::new(1, 1))
        );
        assert!(is_effectively_merged(&grid, CellPos::new(2, 3)));
        assert!(is_merge_child(&grid, CellPos::new(2, 3)));
        assert!(!is_merge_child(&grid, CellPos::new(2, 2)));
        assert!(!is_effectively_merged(&grid, CellPos::new(3, 3)));
    }

    #[test]
    fn validate_accepts_grid_built_by_merge() {
        let mut grid = merged_grid();
        validate(&grid).unwrap();
        grid.unmerge(CellPos::new(2, 3)).unwrap();
        validate(&grid).unwrap();
    }

    #[test]
    fn validate_flags_broken_back_reference() {
        let mut grid = merged_grid();
        grid.update_cell(CellPos::new(2, 3), |c| c.merge = None);
        assert!(matches!(validate(&grid), Err(SheetError::InvalidMerge(_))));
    }

    #[test]
    fn validate_flags_orphan_child() {
        let mut grid = Grid::new(5, 5);
        grid.update_cell(CellPos::new(1, 2), |c| {
            c.merge = Some(Merge::Child(CellPos::new(1, 1)));
        });
        assert!(validate(&grid).is_err());
    }
}
