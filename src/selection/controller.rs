//! Pointer-driven selection and header resizing.
//!
//! `Idle → Selecting | Resizing → Idle`. Pointer-down picks the mode from
//! the hit target, pointer-move updates it, pointer-up always returns to
//! `Idle`.

use crate::layout::{GridGeometry, HeaderSizes, Viewport};
use crate::merge;
use crate::types::{CellPos, CellRange, Grid, Selection};

use super::expand::expand;
use super::keyboard::{step, Direction};

/// Distance from a header boundary (px) that grabs it for resizing.
pub const RESIZE_HANDLE_TOLERANCE: f64 = 4.0;

/// What sits under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Cell(CellPos),
    ColumnHeader(u32),
    RowHeader(u32),
    /// The corner header (select all)
    Corner,
    /// Right edge of a column header
    ColumnBoundary(u32),
    /// Bottom edge of a row header
    RowBoundary(u32),
    /// Nothing (outside any interactive region)
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Column,
    Row,
}

/// An in-progress header resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDrag {
    pub axis: Axis,
    pub index: u32,
    /// Pointer coordinate on the resize axis at pointer-down.
    pub origin: f64,
    /// Unzoomed size at pointer-down.
    pub start_size: f64,
}

/// What a selection drag spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    Cells,
    /// Dragging across column headers
    Columns,
    /// Dragging across row headers
    Rows,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Selecting {
        anchor: CellPos,
        mode: SelectMode,
        /// At least one cell was crossed; suppresses the click.
        moved: bool,
    },
    Resizing(ResizeDrag),
}

/// Result of a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDown {
    /// Selection (and focused cell) changed.
    Selected,
    /// A resize drag started.
    ResizeStarted,
    Ignored,
}

/// Result of a pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerUp {
    /// Pointer went down and up on the same cell.
    Click(CellPos),
    DragEnded,
    ResizeEnded,
    Idle,
}

/// Classify a viewport point.
pub fn hit_test(geometry: &GridGeometry<'_>, x: f64, y: f64) -> HitTarget {
    let (Some(row), Some(col)) = (geometry.row_at_y(y), geometry.col_at_x(x)) else {
        // boundaries of the last column/row sit right at the table's end
        return boundary_at(geometry, x, y).unwrap_or(HitTarget::None);
    };
    match (row, col) {
        (0, 0) => HitTarget::Corner,
        (0, col) => boundary_at(geometry, x, y).unwrap_or(HitTarget::ColumnHeader(col)),
        (row, 0) => boundary_at(geometry, x, y).unwrap_or(HitTarget::RowHeader(row)),
        (row, col) => HitTarget::Cell(CellPos::new(row, col)),
    }
}

fn boundary_at(geometry: &GridGeometry<'_>, x: f64, y: f64) -> Option<HitTarget> {
    if y >= 0.0 && y < geometry.frozen_height() && x >= geometry.frozen_width() {
        let cols = geometry.visible_cols();
        return (cols.start.max(1)..cols.end)
            .find(|&c| {
                let edge = geometry.left(c) + geometry.col_width(c);
                (x - edge).abs() <= RESIZE_HANDLE_TOLERANCE
            })
            .map(HitTarget::ColumnBoundary);
    }
    if x >= 0.0 && x < geometry.frozen_width() && y >= geometry.frozen_height() {
        let rows = geometry.visible_rows();
        return (rows.start.max(1)..rows.end)
            .find(|&r| {
                let edge = geometry.top(r) + geometry.row_height(r);
                (y - edge).abs() <= RESIZE_HANDLE_TOLERANCE
            })
            .map(HitTarget::RowBoundary);
    }
    None
}

/// Selection state plus the pointer state machine.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    drag: DragState,
    selection: Option<Selection>,
    focused: Option<CellPos>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Cell under pointer/keyboard focus (always a merge anchor).
    pub fn focused(&self) -> Option<CellPos> {
        self.focused
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragState::Idle
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.focused = None;
        self.drag = DragState::Idle;
    }

    /// Select `start..end` expanded over merges, keeping the gesture's
    /// direction.
    fn select(&mut self, grid: &Grid, start: CellPos, end: CellPos) {
        let raw = Selection::new(start, end);
        self.selection = Some(raw.oriented(expand(grid, raw.absolute())));
    }

    /// Focus one cell and select its footprint.
    pub fn select_cell(&mut self, grid: &Grid, pos: CellPos) {
        if !grid.in_bounds(pos) {
            return;
        }
        let anchor = merge::resolve_anchor(grid, pos);
        self.focused = Some(anchor);
        self.select(grid, anchor, anchor);
    }

    /// Select a rectangle programmatically.
    pub fn select_range(&mut self, grid: &Grid, start: CellPos, end: CellPos) {
        if !grid.in_bounds(start) || !grid.in_bounds(end) {
            return;
        }
        self.focused = Some(merge::resolve_anchor(grid, start));
        self.select(grid, start, end);
    }

    /// Every data cell.
    pub fn select_all(&mut self, grid: &Grid) {
        if let Some(all) = grid.data_range() {
            self.focused = Some(all.top_left());
            self.selection = Some(Selection::new(all.top_left(), CellPos::new(all.r2, all.c2)));
        }
    }

    fn select_columns(&mut self, grid: &Grid, from: u32, to: u32) {
        let Some(data) = grid.data_range() else {
            return;
        };
        self.focused = Some(merge::resolve_anchor(grid, CellPos::new(data.r1, from)));
        self.select(grid, CellPos::new(data.r1, from), CellPos::new(data.r2, to));
    }

    fn select_rows(&mut self, grid: &Grid, from: u32, to: u32) {
        let Some(data) = grid.data_range() else {
            return;
        };
        self.focused = Some(merge::resolve_anchor(grid, CellPos::new(from, data.c1)));
        self.select(grid, CellPos::new(from, data.c1), CellPos::new(to, data.c2));
    }

    /// Pointer pressed at a viewport point. With `extend`, a cell click
    /// stretches the current selection instead of starting a new one.
    pub fn pointer_down(
        &mut self,
        grid: &Grid,
        sizes: &HeaderSizes,
        viewport: &Viewport,
        x: f64,
        y: f64,
        extend: bool,
    ) -> PointerDown {
        let geometry = GridGeometry::new(sizes, viewport);
        match hit_test(&geometry, x, y) {
            HitTarget::Cell(pos) => {
                match (extend, self.selection) {
                    (true, Some(current)) => self.select(grid, current.start, pos),
                    _ => self.select_cell(grid, pos),
                }
                let anchor = self.selection.map_or(pos, |s| s.start);
                self.drag = DragState::Selecting {
                    anchor: if extend { anchor } else { pos },
                    mode: SelectMode::Cells,
                    moved: false,
                };
                PointerDown::Selected
            }
            HitTarget::ColumnHeader(col) => {
                self.select_columns(grid, col, col);
                self.drag = DragState::Selecting {
                    anchor: CellPos::new(0, col),
                    mode: SelectMode::Columns,
                    moved: false,
                };
                PointerDown::Selected
            }
            HitTarget::RowHeader(row) => {
                self.select_rows(grid, row, row);
                self.drag = DragState::Selecting {
                    anchor: CellPos::new(row, 0),
                    mode: SelectMode::Rows,
                    moved: false,
                };
                PointerDown::Selected
            }
            HitTarget::Corner => {
                self.select_all(grid);
                self.drag = DragState::Idle;
                PointerDown::Selected
            }
            HitTarget::ColumnBoundary(col) => {
                self.drag = DragState::Resizing(ResizeDrag {
                    axis: Axis::Column,
                    index: col,
                    origin: x,
                    start_size: sizes.col_width(col),
                });
                PointerDown::ResizeStarted
            }
            HitTarget::RowBoundary(row) => {
                self.drag = DragState::Resizing(ResizeDrag {
                    axis: Axis::Row,
                    index: row,
                    origin: y,
                    start_size: sizes.row_height(row),
                });
                PointerDown::ResizeStarted
            }
            HitTarget::None => PointerDown::Ignored,
        }
    }

    /// Data cell nearest a viewport point; points beyond the table clamp
    /// to the last row/column, points over the headers to the first one
    /// showing next to them.
    fn clamped_cell(grid: &Grid, geometry: &GridGeometry<'_>, x: f64, y: f64) -> Option<CellPos> {
        let data = grid.data_range()?;
        let row = if y < geometry.frozen_height() {
            geometry
                .row_at_y(geometry.frozen_height())
                .unwrap_or(data.r1)
        } else {
            geometry.row_at_y(y).unwrap_or(data.r2)
        };
        let col = if x < geometry.frozen_width() {
            geometry
                .col_at_x(geometry.frozen_width())
                .unwrap_or(data.c1)
        } else {
            geometry.col_at_x(x).unwrap_or(data.c2)
        };
        Some(CellPos::new(row.clamp(data.r1, data.r2), col.clamp(data.c1, data.c2)))
    }

    /// Pointer moved while a button is held. Returns true when the
    /// selection or a header size changed.
    pub fn pointer_move(
        &mut self,
        grid: &Grid,
        sizes: &mut HeaderSizes,
        viewport: &Viewport,
        x: f64,
        y: f64,
    ) -> bool {
        match self.drag {
            DragState::Idle => false,
            DragState::Resizing(drag) => {
                let zoom = viewport.zoom;
                let (pointer, current) = match drag.axis {
                    Axis::Column => (x, sizes.col_width(drag.index)),
                    Axis::Row => (y, sizes.row_height(drag.index)),
                };
                let size = drag.start_size + (pointer - drag.origin) / zoom;
                if (size - current).abs() < f64::EPSILON {
                    return false;
                }
                match drag.axis {
                    Axis::Column => sizes.set_col_width(drag.index, size),
                    Axis::Row => sizes.set_row_height(drag.index, size),
                }
            }
            DragState::Selecting {
                anchor,
                mode,
                moved,
            } => {
                let geometry = GridGeometry::new(sizes, viewport);
                let Some(target) = Self::clamped_cell(grid, &geometry, x, y) else {
                    return false;
                };
                let before = self.selection;
                let crossed = match mode {
                    SelectMode::Cells => {
                        self.select(grid, anchor, target);
                        target != anchor
                    }
                    SelectMode::Columns => {
                        self.select_columns(grid, anchor.col, target.col);
                        target.col != anchor.col
                    }
                    SelectMode::Rows => {
                        self.select_rows(grid, anchor.row, target.row);
                        target.row != anchor.row
                    }
                };
                if mode == SelectMode::Cells {
                    // the focused cell stays where the drag started
                    self.focused = Some(merge::resolve_anchor(grid, anchor));
                }
                self.drag = DragState::Selecting {
                    anchor,
                    mode,
                    moved: moved || crossed,
                };
                self.selection != before
            }
        }
    }

    /// Pointer released; always ends the drag.
    pub fn pointer_up(&mut self) -> PointerUp {
        let outcome = match self.drag {
            DragState::Idle => PointerUp::Idle,
            DragState::Resizing(_) => PointerUp::ResizeEnded,
            DragState::Selecting {
                anchor,
                mode: SelectMode::Cells,
                moved: false,
            } => PointerUp::Click(anchor),
            DragState::Selecting { .. } => PointerUp::DragEnded,
        };
        self.drag = DragState::Idle;
        outcome
    }

    /// Arrow-key navigation. Moves the focused cell one step (a merge
    /// region counts as one step) or, with `extend`, moves the selection's
    /// far corner. Returns the range to scroll into view.
    pub fn move_focus(&mut self, grid: &Grid, direction: Direction, extend: bool) -> Option<CellRange> {
        let data = grid.data_range()?;
        let focused = self.focused.unwrap_or_else(|| data.top_left());
        if extend {
            let current = self.selection.unwrap_or_else(|| Selection::single(focused));
            let end = step(grid, current.end, direction);
            self.select(grid, current.start, end);
            Some(merge::footprint_rect(grid, end))
        } else {
            let next = merge::resolve_anchor(grid, step(grid, focused, direction));
            self.select_cell(grid, next);
            Some(merge::footprint_rect(grid, next))
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
    use crate::config::GridConfig;

    // header col 48 wide, data cols 100; header row 24, data rows 24
    fn fixture() -> (Grid, HeaderSizes, Viewport) {
        let grid = Grid::new(20, 10);
        let sizes = HeaderSizes::new(20, 10, &GridConfig::default());
        (grid, sizes, Viewport::new(800.0, 400.0))
    }

    fn center(col: u32, row: u32) -> (f64, f64) {
        (48.0 + f64::from(col - 1) * 100.0 + 50.0, 24.0 * f64::from(row) + 12.0)
    }

    #[test]
    fn hit_test_regions() {
        let (_, sizes, vp) = fixture();
        let g = GridGeometry::new(&sizes, &vp);
        assert_eq!(hit_test(&g, 10.0, 10.0), HitTarget::Corner);
        assert_eq!(hit_test(&g, 100.0, 10.0), HitTarget::ColumnHeader(1));
        assert_eq!(hit_test(&g, 147.0, 10.0), HitTarget::ColumnBoundary(1));
        assert_eq!(hit_test(&g, 10.0, 60.0), HitTarget::RowHeader(2));
        assert_eq!(hit_test(&g, 10.0, 71.0), HitTarget::RowBoundary(2));
        assert_eq!(hit_test(&g, 200.0, 60.0), HitTarget::Cell(CellPos::new(2, 2)));
        assert_eq!(hit_test(&g, 5000.0, 60.0), HitTarget::None);
    }

    #[test]
    fn click_without_move_reports_click() {
        let (grid, mut sizes, vp) = fixture();
        let (x, y) = center(3, 4);
        assert_eq!(
            SelectionController::new().pointer_down(&grid, &sizes, &vp, x, y, false),
            PointerDown::Selected
        );
        let mut c = SelectionController::new();
        c.pointer_down(&grid, &sizes, &vp, x, y, false);
        // jitter inside the same cell
        c.pointer_move(&grid, &mut sizes, &vp, x + 3.0, y + 2.0);
        assert_eq!(c.pointer_up(), PointerUp::Click(CellPos::new(4, 3)));
        assert_eq!(c.focused(), Some(CellPos::new(4, 3)));
        assert!(!c.is_dragging());
    }

    #[test]
    fn drag_selects_rectangle_without_click() {
        let (grid, mut sizes, vp) = fixture();
        let mut c = SelectionController::new();
        let (x, y) = center(1, 1);
        c.pointer_down(&grid, &sizes, &vp, x, y, false);
        let (x2, y2) = center(3, 2);
        assert!(c.pointer_move(&grid, &mut sizes, &vp, x2, y2));
        assert_eq!(c.pointer_up(), PointerUp::DragEnded);
        let sel = c.selection().unwrap();
        assert_eq!(sel.absolute(), CellRange { r1: 1, r2: 2, c1: 1, c2: 3 });
        assert_eq!(c.focused(), Some(CellPos::new(1, 1)));
    }

    #[test]
    fn drag_beyond_table_clamps() {
        let (grid, mut sizes, vp) = fixture();
        let mut c = SelectionController::new();
        let (x, y) = center(2, 2);
        c.pointer_down(&grid, &sizes, &vp, x, y, false);
        c.pointer_move(&grid, &mut sizes, &vp, 5000.0, 1.0);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 1, r2: 2, c1: 2, c2: 9 });
    }

    #[test]
    fn header_clicks_select_whole_lines() {
        let (grid, sizes, vp) = fixture();
        let mut c = SelectionController::new();
        c.pointer_down(&grid, &sizes, &vp, 260.0, 10.0, false);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 1, r2: 19, c1: 3, c2: 3 });
        c.pointer_up();

        c.pointer_down(&grid, &sizes, &vp, 10.0, 110.0, false);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 4, r2: 4, c1: 1, c2: 9 });
        c.pointer_up();

        c.pointer_down(&grid, &sizes, &vp, 5.0, 5.0, false);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 1, r2: 19, c1: 1, c2: 9 });
        assert_eq!(c.pointer_up(), PointerUp::Idle);
    }

    #[test]
    fn column_header_drag_extends_columns() {
        let (grid, mut sizes, vp) = fixture();
        let mut c = SelectionController::new();
        c.pointer_down(&grid, &sizes, &vp, 100.0, 10.0, false);
        c.pointer_move(&grid, &mut sizes, &vp, 300.0, 10.0);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 1, r2: 19, c1: 1, c2: 3 });
        assert_eq!(c.pointer_up(), PointerUp::DragEnded);
    }

    #[test]
    fn boundary_drag_resizes_column() {
        let (grid, mut sizes, vp) = fixture();
        let mut c = SelectionController::new();
        assert_eq!(
            c.pointer_down(&grid, &sizes, &vp, 148.0, 10.0, false),
            PointerDown::ResizeStarted
        );
        assert!(c.pointer_move(&grid, &mut sizes, &vp, 178.0, 10.0));
        assert_eq!(sizes.col_width(1), 130.0);
        c.pointer_move(&grid, &mut sizes, &vp, -500.0, 10.0);
        assert_eq!(sizes.col_width(1), crate::layout::MIN_HEADER_SIZE);
        assert_eq!(c.pointer_up(), PointerUp::ResizeEnded);
    }

    #[test]
    fn shift_click_extends_from_anchor() {
        let (grid, sizes, vp) = fixture();
        let mut c = SelectionController::new();
        let (x, y) = center(2, 2);
        c.pointer_down(&grid, &sizes, &vp, x, y, false);
        c.pointer_up();
        let (x2, y2) = center(4, 5);
        c.pointer_down(&grid, &sizes, &vp, x2, y2, true);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 2, r2: 5, c1: 2, c2: 4 });
    }

    #[test]
    fn arrow_keys_step_over_merges() {
        let (mut grid, _, _) = fixture();
        grid.merge(CellRange { r1: 2, r2: 3, c1: 3, c2: 5 }).unwrap();
        let mut c = SelectionController::new();
        c.select_cell(&grid, CellPos::new(2, 2));
        c.move_focus(&grid, Direction::Right, false);
        assert_eq!(c.focused(), Some(CellPos::new(2, 3)));
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 2, r2: 3, c1: 3, c2: 5 });
        c.move_focus(&grid, Direction::Right, false);
        assert_eq!(c.focused(), Some(CellPos::new(2, 6)));
        c.move_focus(&grid, Direction::Up, false);
        c.move_focus(&grid, Direction::Up, false);
        assert_eq!(c.focused(), Some(CellPos::new(1, 6)));
    }

    #[test]
    fn shift_arrows_extend_with_expansion() {
        let (mut grid, _, _) = fixture();
        grid.merge(CellRange { r1: 3, r2: 4, c1: 3, c2: 3 }).unwrap();
        let mut c = SelectionController::new();
        c.select_cell(&grid, CellPos::new(2, 2));
        c.move_focus(&grid, Direction::Right, true);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 2, r2: 2, c1: 2, c2: 3 });
        c.move_focus(&grid, Direction::Down, true);
        assert_eq!(c.selection().unwrap().absolute(), CellRange { r1: 2, r2: 4, c1: 2, c2: 3 });
        assert_eq!(c.focused(), Some(CellPos::new(2, 2)));
    }
}
