//! Selection overlay helpers.
//!
//! These helpers keep selection math testable without depending on Canvas APIs.

use crate::layout::{CellRect, GridGeometry};
use crate::merge;
use crate::types::{CellPos, Grid, Selection};

/// Side of the square drag handle at the selection's bottom-right corner.
pub const HANDLE_SIZE: f64 = 8.0;

/// True when the selection covers one cell, or exactly one merge region.
pub fn is_single_cell(grid: &Grid, selection: &Selection) -> bool {
    let range = selection.absolute();
    range.is_single_cell() || merge::footprint_rect(grid, range.top_left()) == range
}

/// Outline rectangle for the selection, or `None` when it is a single cell
/// and the text editor has focus (the editor's border stands in for it).
pub fn selection_outline(
    grid: &Grid,
    geometry: &GridGeometry<'_>,
    selection: &Selection,
    editor_focused: bool,
) -> Option<CellRect> {
    if editor_focused && is_single_cell(grid, selection) {
        return None;
    }
    let rect = geometry.range_rect(selection.absolute());
    (rect.width > 0.0 && rect.height > 0.0).then_some(rect)
}

/// Highlight rectangle for the focused cell; hidden while editing.
pub fn focus_outline(
    grid: &Grid,
    geometry: &GridGeometry<'_>,
    focused: CellPos,
    editor_focused: bool,
) -> Option<CellRect> {
    if editor_focused || !grid.in_bounds(focused) {
        return None;
    }
    Some(geometry.cell_rect(grid, focused))
}

/// The drag handle square, centred on the outline's bottom-right corner.
pub fn handle_rect(outline: &CellRect) -> CellRect {
    CellRect {
        x: outline.right() - HANDLE_SIZE / 2.0,
        y: outline.bottom() - HANDLE_SIZE / 2.0,
        width: HANDLE_SIZE,
        height: HANDLE_SIZE,
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
    use crate::config::GridConfig;
    use crate::layout::{HeaderSizes, Viewport};
    use crate::types::CellRange;

    fn fixture() -> (Grid, HeaderSizes, Viewport) {
        let mut grid = Grid::new(10, 10);
        grid.merge(CellRange { r1: 2, r2: 3, c1: 2, c2: 3 }).unwrap();
        let sizes = HeaderSizes::new(10, 10, &GridConfig::default());
        (grid, sizes, Viewport::new(800.0, 600.0))
    }

    #[test]
    fn outline_hidden_for_single_cell_while_editing() {
        let (grid, sizes, vp) = fixture();
        let g = GridGeometry::new(&sizes, &vp);
        let single = Selection::single(CellPos::new(5, 5));
        assert!(selection_outline(&grid, &g, &single, true).is_none());
        assert!(selection_outline(&grid, &g, &single, false).is_some());

        let merged = Selection::new(CellPos::new(2, 2), CellPos::new(3, 3));
        assert!(is_single_cell(&grid, &merged));
        assert!(selection_outline(&grid, &g, &merged, true).is_none());

        let multi = Selection::new(CellPos::new(1, 1), CellPos::new(2, 1));
        assert!(selection_outline(&grid, &g, &multi, true).is_some());
    }

    #[test]
    fn outline_covers_reversed_selection() {
        let (grid, sizes, vp) = fixture();
        let g = GridGeometry::new(&sizes, &vp);
        let sel = Selection::new(CellPos::new(3, 2), CellPos::new(1, 1));
        let rect = selection_outline(&grid, &g, &sel, false).unwrap();
        assert_eq!(rect.x, 48.0);
        assert_eq!(rect.y, 24.0);
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 72.0);
        let handle = handle_rect(&rect);
        assert_eq!(handle.x, 244.0);
    }

    #[test]
    fn focus_outline_uses_merge_footprint() {
        let (grid, sizes, vp) = fixture();
        let g = GridGeometry::new(&sizes, &vp);
        let rect = focus_outline(&grid, &g, CellPos::new(3, 3), false).unwrap();
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 48.0);
        assert!(focus_outline(&grid, &g, CellPos::new(3, 3), true).is_none());
    }
}
