//! Coordinate engine against brute-force cumulative sums.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

mod common;

use common::{geometry, GridBuilder};
use sheetgrid::layout::{HeaderSizes, Viewport};
use sheetgrid::{CellPos, GridConfig};
use test_case::test_case;

/// Visible `[start, end)` by walking the sizes one at a time.
fn brute_force_range(sizes: &[f64], zoom: f64, offset: f64, extent: f64) -> (u32, u32) {
    let count = sizes.len();
    let mut start = 0;
    let mut acc = 0.0;
    while start + 1 < count && acc + sizes[start] * zoom <= offset {
        acc += sizes[start] * zoom;
        start += 1;
    }
    let mut end = count;
    let mut sum = 0.0;
    for (i, size) in sizes.iter().enumerate().skip(start) {
        sum += size * zoom;
        if sum > extent {
            end = i + 1;
            break;
        }
    }
    (start as u32, end as u32)
}

/// Irregular but integral sizes so sums stay exact.
fn irregular(count: usize, header: f64) -> Vec<f64> {
    let mut sizes = vec![header];
    sizes.extend((1..count).map(|i| 10.0 + ((i * 37) % 90) as f64));
    sizes
}

#[test_case(1.0; "unzoomed")]
#[test_case(2.0; "double")]
#[test_case(0.5; "half")]
fn visible_rows_match_brute_force(zoom: f64) {
    let rows = irregular(200, 24.0);
    let cols = irregular(40, 48.0);
    let sizes = HeaderSizes::from_sizes(cols.clone(), rows.clone());
    for offset in (0..4000).step_by(37) {
        let mut viewport = Viewport::new(640.0, 480.0);
        viewport.zoom = zoom;
        viewport.scroll_y = f64::from(offset);
        viewport.scroll_x = f64::from(offset) / 4.0;
        let g = geometry(&sizes, &viewport);

        let (start, end) = brute_force_range(&rows, zoom, viewport.scroll_y, viewport.height);
        assert_eq!(g.visible_rows(), start..end, "rows at scroll {offset}");
        let (start, end) = brute_force_range(&cols, zoom, viewport.scroll_x, viewport.width);
        assert_eq!(g.visible_cols(), start..end, "cols at scroll {offset}");
    }
}

#[test]
fn frozen_origin_pinned_for_any_scroll() {
    let (_, sizes) = GridBuilder::new(100, 30).build();
    for (sx, sy) in [(0.0, 0.0), (13.0, 7.0), (900.0, 1500.0)] {
        let mut viewport = Viewport::new(500.0, 300.0);
        viewport.set_scroll(sx, sy, &sizes);
        let g = geometry(&sizes, &viewport);
        assert_eq!(g.left(0), 0.0);
        assert_eq!(g.top(0), 0.0);
        assert_eq!(g.left(1), 48.0 - viewport.scroll_x);
    }
}

#[test]
fn hit_lookup_inverts_positions() {
    let (_, sizes) = GridBuilder::new(50, 20).col_width(3, 250.0).build();
    let mut viewport = Viewport::new(600.0, 400.0);
    viewport.set_scroll(120.0, 60.0, &sizes);
    let g = geometry(&sizes, &viewport);
    for col in g.visible_cols().start.max(1)..g.visible_cols().end {
        let x = g.left(col) + 1.0;
        if x >= g.frozen_width() {
            assert_eq!(g.col_at_x(x), Some(col));
        }
    }
    for row in g.visible_rows().start.max(1)..g.visible_rows().end {
        let y = g.top(row) + 1.0;
        if y >= g.frozen_height() {
            assert_eq!(g.row_at_y(y), Some(row));
        }
    }
}

#[test]
fn merged_rect_covers_whole_span() {
    let (grid, sizes) = GridBuilder::new(10, 10)
        .merge(2, 2, 3, 4)
        .row_height(3, 40.0)
        .build();
    let viewport = Viewport::new(800.0, 600.0);
    let g = geometry(&sizes, &viewport);
    // child resolves to the anchor's rectangle
    let rect = g.cell_rect(&grid, CellPos::new(3, 4));
    assert_eq!(rect.x, 48.0 + 100.0);
    assert_eq!(rect.y, 24.0 + 24.0);
    assert_eq!(rect.width, 300.0);
    assert_eq!(rect.height, 64.0);
}

#[test]
fn scroll_clamps_to_content() {
    let sizes = HeaderSizes::new(11, 5, &GridConfig::default());
    // 48 + 4 * 100 = 448 wide, 11 * 24 = 264 tall
    let mut viewport = Viewport::new(300.0, 200.0);
    viewport.set_scroll(10_000.0, -50.0, &sizes);
    assert_eq!(viewport.scroll_x, 148.0);
    assert_eq!(viewport.scroll_y, 0.0);
    viewport.resize(1000.0, 1000.0, &sizes);
    assert_eq!(viewport.scroll_x, 0.0);
}

#[test]
fn zoom_keeps_content_under_corner() {
    let sizes = HeaderSizes::new(200, 50, &GridConfig::default());
    let mut viewport = Viewport::new(400.0, 300.0);
    viewport.set_scroll(500.0, 480.0, &sizes);
    viewport.set_zoom(2.0, &sizes);
    assert_eq!(viewport.scroll_x, 1000.0);
    assert_eq!(viewport.scroll_y, 960.0);
    let g = geometry(&sizes, &viewport);
    assert_eq!(g.col_width(1), 200.0);
}
