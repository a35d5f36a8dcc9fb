//! Text overflow into empty neighbours and the borders it hides.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{measure, recording_surface, GridBuilder};
use sheetgrid::layout::{GridGeometry, HeaderSizes, Viewport};
use sheetgrid::render::{DrawOp, OverflowMap};
use sheetgrid::{CellPos, CellStyle, Grid, GridConfig, HAlign};

fn overflow(grid: &Grid, sizes: &HeaderSizes) -> OverflowMap {
    let viewport = Viewport::new(1000.0, 400.0);
    let geometry = GridGeometry::new(sizes, &viewport);
    OverflowMap::compute(grid, &geometry, &GridConfig::default(), &mut measure())
}

fn aligned(align: HAlign) -> CellStyle {
    CellStyle {
        align,
        ..CellStyle::default()
    }
}

#[test]
fn hello_world_hides_only_the_first_boundary() {
    // 11 chars * 7px = 77px; column 1 leaves 60 - 2 * 4 = 52px
    let (grid, sizes) = GridBuilder::new(5, 5)
        .value(1, 1, "Hello World")
        .col_width(1, 60.0)
        .build();
    let map = overflow(&grid, &sizes);
    assert!(map.edges(CellPos::new(1, 1)).right);
    assert!(map.edges(CellPos::new(1, 2)).left);
    assert!(!map.edges(CellPos::new(1, 2)).right);
    assert!(!map.edges(CellPos::new(1, 3)).left);
    assert_eq!(map.spill(CellPos::new(1, 1)).right, 100.0);
    // other rows untouched
    assert!(!map.edges(CellPos::new(2, 1)).right);
}

#[test]
fn text_that_fits_hides_nothing() {
    let (grid, sizes) = GridBuilder::new(5, 5).value(1, 1, "short").build();
    assert_eq!(overflow(&grid, &sizes).hidden_count(), 0);
}

#[test]
fn non_empty_neighbour_stops_the_spill() {
    let (grid, sizes) = GridBuilder::new(5, 5)
        .value(1, 1, "Hello World")
        .value(1, 2, "x")
        .col_width(1, 60.0)
        .build();
    let map = overflow(&grid, &sizes);
    assert!(!map.edges(CellPos::new(1, 1)).right);
    assert_eq!(map.spill(CellPos::new(1, 1)).right, 0.0);
}

#[test]
fn long_text_crosses_several_columns() {
    // 40 chars = 280px, interior 92px: needs 188 more, i.e. two columns
    let (grid, sizes) = GridBuilder::new(5, 8)
        .value(2, 1, &"a".repeat(40))
        .build();
    let map = overflow(&grid, &sizes);
    assert!(map.edges(CellPos::new(2, 1)).right);
    assert!(map.edges(CellPos::new(2, 2)).right);
    assert!(!map.edges(CellPos::new(2, 3)).right);
}

#[test]
fn right_aligned_text_spills_left() {
    let (grid, sizes) = GridBuilder::new(5, 6)
        .style(1, 3, aligned(HAlign::Right))
        .value(1, 3, &"b".repeat(20))
        .build();
    let map = overflow(&grid, &sizes);
    assert!(map.edges(CellPos::new(1, 3)).left);
    assert!(map.edges(CellPos::new(1, 2)).right);
    assert!(!map.edges(CellPos::new(1, 3)).right);
    assert!(!map.edges(CellPos::new(1, 2)).left);
}

#[test]
fn centered_text_spills_both_ways_without_transfer() {
    // 30 chars = 210px, excess 118px: 59px per side
    let (grid, sizes) = GridBuilder::new(5, 6)
        .style(1, 3, aligned(HAlign::Center))
        .value(1, 3, &"c".repeat(30))
        .value(1, 2, "blocker")
        .build();
    let map = overflow(&grid, &sizes);
    // left side blocked; its half is not handed to the right
    assert!(!map.edges(CellPos::new(1, 3)).left);
    assert!(map.edges(CellPos::new(1, 3)).right);
    assert!(!map.edges(CellPos::new(1, 4)).right);
    let spill = map.spill(CellPos::new(1, 3));
    assert_eq!((spill.left, spill.right), (0.0, 100.0));
}

#[test]
fn wrapped_and_merged_cells_refuse_spill() {
    let (grid, sizes) = GridBuilder::new(6, 6)
        .value(1, 1, &"w".repeat(30))
        .wrapped(1, 2)
        .value(3, 1, &"m".repeat(30))
        .merge(3, 2, 4, 3)
        .build();
    let map = overflow(&grid, &sizes);
    assert!(!map.edges(CellPos::new(1, 1)).right);
    assert!(!map.edges(CellPos::new(3, 1)).right);
}

#[test]
fn wrapped_source_never_spills() {
    let (grid, sizes) = GridBuilder::new(5, 5)
        .wrapped(1, 1)
        .value(1, 1, &"z".repeat(40))
        .build();
    assert_eq!(overflow(&grid, &sizes).hidden_count(), 0);
}

#[test]
fn never_hides_border_between_two_filled_cells() {
    let mut builder = GridBuilder::new(12, 10);
    for row in 1..12u32 {
        for col in 1..10u32 {
            if (row * 7 + col * 3) % 4 != 0 {
                continue;
            }
            let len = ((row + col) % 5 + 1) as usize * 8;
            builder = builder.value(row, col, &"q".repeat(len));
        }
    }
    let (grid, sizes) = builder.build();
    let map = overflow(&grid, &sizes);
    for row in 1..12u32 {
        for col in 1..9u32 {
            let here = CellPos::new(row, col);
            let next = CellPos::new(row, col + 1);
            if !grid.value(here).is_empty() && !grid.value(next).is_empty() {
                assert!(!map.edges(here).right, "border hidden at {here:?}");
                assert!(!map.edges(next).left, "border hidden at {next:?}");
            }
        }
    }
}

#[test]
fn zoom_widens_columns_so_text_fits() {
    let (grid, sizes) = GridBuilder::new(5, 5)
        .value(1, 1, "Hello World")
        .col_width(1, 60.0)
        .build();
    let mut viewport = Viewport::new(1000.0, 400.0);
    viewport.set_zoom(2.0, &sizes);
    let geometry = GridGeometry::new(&sizes, &viewport);
    // fixed 7px advance: 77px now fits in 120 - 16
    let map = OverflowMap::compute(&grid, &geometry, &GridConfig::default(), &mut measure());
    assert_eq!(map.hidden_count(), 0);
}

#[test]
fn renderer_skips_hidden_grid_line() {
    let mut state = GridBuilder::new(5, 5)
        .value(1, 1, "Hello World")
        .col_width(1, 60.0)
        .state(800.0, 300.0);
    let mut surface = recording_surface();
    state.render(&mut surface);

    let grid_color = state.config.grid_line_color.clone();
    let vertical_at = |x: f64| {
        surface.ops.iter().any(|op| {
            matches!(op, DrawOp::Line { from, to, color, .. }
                if from.0 == x && to.0 == x && from.1 == 24.0 && to.1 == 48.0 && *color == grid_color)
        })
    };
    // column 1 ends at 48 + 60 = 108, column 2 at 208
    assert!(!vertical_at(108.0));
    assert!(vertical_at(208.0));
    assert!(surface.clips_balanced());
}

#[test]
fn text_from_a_column_scrolled_off_screen_keeps_spilling() {
    // 60 chars = 420px: column 1 plus four more columns of spill
    let mut state = GridBuilder::new(5, 20)
        .value(1, 1, &"s".repeat(60))
        .state(500.0, 300.0);
    // column 1 spans 48..148 in content space, fully scrolled out
    state.set_scroll(150.0, 0.0, &mut measure());
    let mut surface = recording_surface();
    state.render(&mut surface);

    let grid_color = state.config.grid_line_color.clone();
    let vertical_at = |x: f64| {
        surface.ops.iter().any(|op| {
            matches!(op, DrawOp::Line { from, to, color, .. }
                if from.0 == x && to.0 == x && from.1 == 24.0 && to.1 == 48.0 && *color == grid_color)
        })
    };
    // right edges of columns 2, 3 and 4 stay hidden; column 5 ends the spill
    assert!(!vertical_at(98.0));
    assert!(!vertical_at(198.0));
    assert!(!vertical_at(298.0));
    assert!(vertical_at(398.0));

    let text = surface.text_index(&"s".repeat(60)).unwrap();
    let header = surface.text_index("B").unwrap();
    assert!(text < header);
    assert!(surface.clips_balanced());
}
