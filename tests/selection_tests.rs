//! Merge-aware selection: drag gestures, header clicks, resize drags and
//! keyboard navigation.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{cell_center, GridBuilder};
use sheetgrid::layout::Viewport;
use sheetgrid::selection::{
    expand, step, Direction, DragState, PointerDown, PointerUp, SelectionController,
};
use sheetgrid::{CellPos, CellRange, Grid};
use test_case::test_case;

fn range(r1: u32, c1: u32, r2: u32, c2: u32) -> CellRange {
    CellRange { r1, r2, c1, c2 }
}

// ============================================================================
// Expansion properties
// ============================================================================

fn merged_grid() -> Grid {
    let (grid, _) = GridBuilder::new(20, 12)
        .merge(2, 2, 2, 4)
        .merge(4, 5, 6, 6)
        .merge(7, 1, 8, 2)
        .merge(9, 8, 12, 9)
        .build();
    grid
}

#[test]
fn expansion_is_idempotent_and_covering() {
    let grid = merged_grid();
    for r1 in 1..14 {
        for c1 in 1..11 {
            for (dr, dc) in [(0, 0), (1, 2), (3, 1), (5, 4)] {
                let raw = range(r1, c1, (r1 + dr).min(19), (c1 + dc).min(11));
                let once = expand(&grid, raw);
                assert!(once.encloses(&raw), "{raw:?} -> {once:?}");
                assert_eq!(expand(&grid, once), once, "not a fixed point for {raw:?}");
            }
        }
    }
}

#[test]
fn expanded_selection_never_slices_a_merge() {
    let grid = merged_grid();
    let merges = [range(2, 2, 2, 4), range(4, 5, 6, 6), range(7, 1, 8, 2), range(9, 8, 12, 9)];
    for r1 in 1..14 {
        for c1 in 1..11 {
            let out = expand(&grid, range(r1, c1, r1 + 1, c1 + 1));
            for m in merges {
                if out.intersects(&m) {
                    assert!(out.encloses(&m), "{out:?} slices {m:?}");
                }
            }
        }
    }
}

// ============================================================================
// Pointer gestures
// ============================================================================

#[test]
fn drag_into_wide_merge_expands_to_its_columns() {
    let (grid, mut sizes) = GridBuilder::new(10, 10).merge(2, 2, 2, 4).build();
    let viewport = Viewport::new(1200.0, 600.0);
    let mut controller = SelectionController::new();

    let (x, y) = cell_center(&sizes, 5, 5);
    assert_eq!(
        controller.pointer_down(&grid, &sizes, &viewport, x, y, false),
        PointerDown::Selected
    );
    let (x, y) = cell_center(&sizes, 2, 3);
    assert!(controller.pointer_move(&grid, &mut sizes, &viewport, x, y));
    assert_eq!(controller.pointer_up(), PointerUp::DragEnded);

    let selection = controller.selection().unwrap();
    // rows 2..5 from the drag, column 2 pulled in by the merge at row 2
    assert_eq!(selection.absolute(), range(2, 2, 5, 5));
    assert_eq!(selection.start, CellPos::new(5, 5));
    assert_eq!(controller.focused(), Some(CellPos::new(5, 5)));
}

#[test]
fn click_without_move_reports_cell() {
    let (grid, mut sizes) = GridBuilder::new(10, 10).build();
    let viewport = Viewport::new(800.0, 600.0);
    let mut controller = SelectionController::new();
    let (x, y) = cell_center(&sizes, 3, 2);
    controller.pointer_down(&grid, &sizes, &viewport, x, y, false);
    controller.pointer_move(&grid, &mut sizes, &viewport, x + 2.0, y + 1.0);
    assert_eq!(controller.pointer_up(), PointerUp::Click(CellPos::new(3, 2)));
    assert!(!controller.is_dragging());
}

#[test]
fn clicking_merge_child_focuses_anchor() {
    let (grid, sizes) = GridBuilder::new(10, 10).merge(2, 2, 3, 3).build();
    let viewport = Viewport::new(800.0, 600.0);
    let mut controller = SelectionController::new();
    let (x, y) = cell_center(&sizes, 3, 3);
    controller.pointer_down(&grid, &sizes, &viewport, x, y, false);
    assert_eq!(controller.focused(), Some(CellPos::new(2, 2)));
    assert_eq!(controller.selection().unwrap().absolute(), range(2, 2, 3, 3));
}

#[test]
fn drag_past_table_end_clamps_to_last_cell() {
    let (grid, mut sizes) = GridBuilder::new(6, 4).build();
    let viewport = Viewport::new(2000.0, 2000.0);
    let mut controller = SelectionController::new();
    let (x, y) = cell_center(&sizes, 2, 2);
    controller.pointer_down(&grid, &sizes, &viewport, x, y, false);
    controller.pointer_move(&grid, &mut sizes, &viewport, 1900.0, 1900.0);
    assert_eq!(controller.selection().unwrap().absolute(), range(2, 2, 5, 3));
    // back over the headers clamps to the first data row/column
    controller.pointer_move(&grid, &mut sizes, &viewport, 5.0, 5.0);
    assert_eq!(controller.selection().unwrap().absolute(), range(1, 1, 2, 2));
}

#[test]
fn scrolled_drag_over_headers_stops_at_first_shown_cell() {
    let (grid, mut sizes) = GridBuilder::new(40, 12).build();
    let mut viewport = Viewport::new(800.0, 300.0);
    // row 11 (264..288) and column 3 (248..348) meet the header edges
    viewport.set_scroll(250.0, 240.0, &sizes);
    let mut controller = SelectionController::new();
    let (x, y) = cell_center(&sizes, 15, 6);
    controller.pointer_down(&grid, &sizes, &viewport, x - 250.0, y - 240.0, false);
    assert_eq!(controller.focused(), Some(CellPos::new(15, 6)));

    controller.pointer_move(&grid, &mut sizes, &viewport, 5.0, 5.0);
    assert_eq!(controller.selection().unwrap().absolute(), range(11, 3, 15, 6));
    // over the row header only
    controller.pointer_move(&grid, &mut sizes, &viewport, 20.0, y - 240.0);
    assert_eq!(controller.selection().unwrap().absolute(), range(15, 3, 15, 6));
    // over the column header only
    controller.pointer_move(&grid, &mut sizes, &viewport, x - 250.0, 10.0);
    assert_eq!(controller.selection().unwrap().absolute(), range(11, 6, 15, 6));
}

#[test]
fn shift_click_extends_from_anchor() {
    let (grid, sizes) = GridBuilder::new(10, 10).build();
    let viewport = Viewport::new(800.0, 600.0);
    let mut controller = SelectionController::new();
    let (x, y) = cell_center(&sizes, 2, 2);
    controller.pointer_down(&grid, &sizes, &viewport, x, y, false);
    controller.pointer_up();
    let (x, y) = cell_center(&sizes, 4, 5);
    controller.pointer_down(&grid, &sizes, &viewport, x, y, true);
    assert_eq!(controller.selection().unwrap().absolute(), range(2, 2, 4, 5));
}

#[test_case(10.0, 10.0, range(1, 1, 9, 9); "corner selects all")]
#[test_case(200.0, 12.0, range(1, 2, 9, 2); "column header")]
#[test_case(20.0, 60.0, range(2, 1, 2, 9); "row header")]
fn header_clicks(x: f64, y: f64, expected: CellRange) {
    let (grid, sizes) = GridBuilder::new(10, 10).build();
    let viewport = Viewport::new(1200.0, 600.0);
    let mut controller = SelectionController::new();
    assert_eq!(
        controller.pointer_down(&grid, &sizes, &viewport, x, y, false),
        PointerDown::Selected
    );
    assert_eq!(controller.selection().unwrap().absolute(), expected);
}

#[test]
fn column_header_drag_extends_columns() {
    let (grid, mut sizes) = GridBuilder::new(10, 10).build();
    let viewport = Viewport::new(1200.0, 600.0);
    let mut controller = SelectionController::new();
    controller.pointer_down(&grid, &sizes, &viewport, 200.0, 12.0, false);
    // column 4 spans 348..448
    controller.pointer_move(&grid, &mut sizes, &viewport, 400.0, 300.0);
    assert_eq!(controller.selection().unwrap().absolute(), range(1, 2, 9, 4));
    assert_eq!(controller.pointer_up(), PointerUp::DragEnded);
}

#[test]
fn boundary_drag_resizes_column_with_minimum() {
    let (grid, mut sizes) = GridBuilder::new(10, 10).build();
    let viewport = Viewport::new(1200.0, 600.0);
    let mut controller = SelectionController::new();
    // right edge of column 1 sits at 148
    assert_eq!(
        controller.pointer_down(&grid, &sizes, &viewport, 150.0, 12.0, false),
        PointerDown::ResizeStarted
    );
    assert!(matches!(controller.drag_state(), DragState::Resizing(_)));
    assert!(controller.pointer_move(&grid, &mut sizes, &viewport, 180.0, 12.0));
    assert_eq!(sizes.col_width(1), 130.0);
    controller.pointer_move(&grid, &mut sizes, &viewport, -500.0, 12.0);
    assert_eq!(sizes.col_width(1), 8.0);
    assert_eq!(controller.pointer_up(), PointerUp::ResizeEnded);
    assert_eq!(controller.drag_state(), DragState::Idle);
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn arrows_treat_merge_as_one_step() {
    let (grid, _) = GridBuilder::new(10, 10).merge(3, 3, 4, 5).build();
    assert_eq!(step(&grid, CellPos::new(3, 2), Direction::Right), CellPos::new(3, 3));
    assert_eq!(step(&grid, CellPos::new(3, 3), Direction::Right), CellPos::new(3, 6));
    assert_eq!(step(&grid, CellPos::new(3, 3), Direction::Down), CellPos::new(5, 3));
}

#[test]
fn shift_arrow_extends_over_merges() {
    let (grid, _) = GridBuilder::new(10, 10).merge(3, 3, 4, 5).build();
    let mut controller = SelectionController::new();
    controller.select_cell(&grid, CellPos::new(2, 4));
    controller.move_focus(&grid, Direction::Down, true);
    // stepping into the merge pulls in its whole footprint
    assert_eq!(controller.selection().unwrap().absolute(), range(2, 3, 4, 5));
    assert_eq!(controller.focused(), Some(CellPos::new(2, 4)));
}
