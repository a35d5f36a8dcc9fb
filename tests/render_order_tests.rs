//! Paint order of full frames, driven through `GridState`.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{measure, recording_surface, GridBuilder};
use sheetgrid::render::{DrawOp, RecordingSurface};
use sheetgrid::{CellPos, CellRange, GridState};

fn frame(state: &mut GridState) -> RecordingSurface {
    let mut surface = recording_surface();
    state.render(&mut surface);
    surface
}

fn fill_index(surface: &RecordingSurface, color: &str) -> Option<usize> {
    surface.position(|op| matches!(op, DrawOp::FillRect { color: c, .. } if c == color))
}

#[test]
fn scrolled_body_is_painted_under_headers() {
    let mut state = GridBuilder::new(40, 12)
        .value(6, 4, "deep cell")
        .state(500.0, 300.0);
    state.set_scroll(250.0, 100.0, &mut measure());
    let surface = frame(&mut state);

    assert!(matches!(surface.ops[0], DrawOp::BeginFrame { .. }));
    let body = surface.text_index("deep cell").unwrap();
    let col_label = surface.text_index("D").unwrap();
    assert!(body < col_label);

    // the separators come after every body grid line
    let separator = state.config.frozen_separator_color.clone();
    let grid_line = state.config.grid_line_color.clone();
    let first_separator = surface
        .position(|op| matches!(op, DrawOp::Line { color, .. } if *color == separator))
        .unwrap();
    let last_grid_line = surface
        .ops
        .iter()
        .rposition(|op| matches!(op, DrawOp::Line { color, .. } if *color == grid_line))
        .unwrap();
    assert!(last_grid_line < first_separator);

    // corner glyph closes the frame
    assert!(matches!(surface.ops.last(), Some(DrawOp::Polygon { .. })));
    assert!(surface.clips_balanced());
}

#[test]
fn selection_sits_between_body_and_headers() {
    let mut state = GridBuilder::new(10, 6).value(2, 2, "picked").state(600.0, 300.0);
    state.selection.select_range(
        &state.grid,
        CellPos::new(2, 2),
        CellPos::new(3, 3),
    );
    let surface = frame(&mut state);

    let fill = fill_index(&surface, &state.config.selection_fill).unwrap();
    let body = surface.text_index("picked").unwrap();
    let highlighted = fill_index(&surface, &state.config.header_selected_background).unwrap();
    assert!(body < fill);
    assert!(fill < highlighted);
}

#[test]
fn selected_headers_are_highlighted() {
    let mut state = GridBuilder::new(10, 6).state(600.0, 300.0);
    state.selection.select_range(
        &state.grid,
        CellPos::new(2, 2),
        CellPos::new(4, 3),
    );
    let surface = frame(&mut state);
    let highlight = state.config.header_selected_background.clone();
    let count = surface
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::FillRect { color, .. } if *color == highlight))
        .count();
    // rows 2..=4 and columns 2..=3
    assert_eq!(count, 5);
}

#[test]
fn merged_anchor_text_drawn_once() {
    let mut state = GridBuilder::new(10, 6)
        .value(2, 2, "spanning")
        .merge(2, 2, 4, 4)
        .state(600.0, 300.0);
    let surface = frame(&mut state);
    assert_eq!(surface.texts().iter().filter(|t| **t == "spanning").count(), 1);
}

#[test]
fn open_editor_hides_focus_highlight_and_paints_itself() {
    let mut state = GridBuilder::new(10, 6).value(1, 1, "edit").state(600.0, 300.0);
    assert!(state.open_editor(CellPos::new(1, 1), &mut measure()));
    let surface = frame(&mut state);
    let outline = state.config.selection_color.clone();
    assert!(!surface
        .ops
        .iter()
        .any(|op| matches!(op, DrawOp::StrokeRect { color, .. } if *color == outline)));

    let mut editor_surface = recording_surface();
    assert!(state.render_editor(&mut editor_surface, true));
    assert!(matches!(editor_surface.ops[0], DrawOp::BeginFrame { .. }));
    assert!(editor_surface.text_index("edit").is_some());
    // border is the last stroke
    assert!(matches!(editor_surface.ops.last(), Some(DrawOp::StrokeRect { .. })));

    state.cancel_edit();
    let mut editor_surface = recording_surface();
    assert!(!state.render_editor(&mut editor_surface, true));
    assert!(editor_surface.ops.is_empty());
}

#[test]
fn render_clears_dirty_flag() {
    let mut state = GridBuilder::new(10, 6).state(600.0, 300.0);
    state.invalidate();
    assert!(state.needs_render);
    frame(&mut state);
    assert!(!state.needs_render);
    assert!(state.set_cell_value(3, 3, "changed").is_ok());
    assert!(state.needs_render);
    let surface = frame(&mut state);
    assert!(surface.text_index("changed").is_some());
    frame(&mut state);
    let range = CellRange::from_corners(CellPos::new(3, 3), CellPos::new(3, 4));
    assert!(state.merge_cells(range).is_ok());
    assert!(state.needs_render);
}
