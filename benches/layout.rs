//! Benchmarks for the per-frame layout work on a large grid.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sheetgrid::editor::compute_lines;
use sheetgrid::layout::{GridGeometry, HeaderSizes, Viewport};
use sheetgrid::render::{MonospaceMeasure, OverflowMap, RecordingSurface};
use sheetgrid::{CellPos, Grid, GridConfig, GridState};

const ROWS: u32 = 5_000;
const COLS: u32 = 60;

/// Sparse grid with a long value every few cells so overflow has work.
fn populated_grid() -> Grid {
    let mut grid = Grid::new(ROWS, COLS);
    for row in (1..2_000).step_by(3) {
        for col in (1..40).step_by(4) {
            let len = ((row + col) % 6 + 1) as usize * 6;
            grid.set_value(CellPos::new(row, col), &"x".repeat(len));
        }
    }
    grid
}

fn varied_sizes(config: &GridConfig) -> HeaderSizes {
    let mut sizes = HeaderSizes::new(ROWS, COLS, config);
    for row in (1..ROWS).step_by(7) {
        sizes.set_row_height(row, 24.0 + f64::from(row % 30));
    }
    for col in (1..COLS).step_by(5) {
        sizes.set_col_width(col, 60.0 + f64::from(col % 90));
    }
    sizes
}

/// Visible range lookup at several scroll depths.
fn bench_visible_range(c: &mut Criterion) {
    let config = GridConfig::default();
    let sizes = varied_sizes(&config);
    let mut group = c.benchmark_group("visible_range");
    for depth in [0.0, 20_000.0, 90_000.0] {
        let mut viewport = Viewport::new(1600.0, 900.0);
        viewport.set_scroll(depth / 10.0, depth, &sizes);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &viewport, |b, vp| {
            b.iter(|| {
                let geometry = GridGeometry::new(black_box(&sizes), vp);
                (geometry.visible_rows(), geometry.visible_cols())
            });
        });
    }
    group.finish();
}

fn bench_overflow(c: &mut Criterion) {
    let config = GridConfig::default();
    let grid = populated_grid();
    let sizes = HeaderSizes::new(ROWS, COLS, &config);
    let viewport = Viewport::new(1600.0, 900.0);
    let mut measure = MonospaceMeasure::new(7.0);

    c.bench_function("overflow_compute", |b| {
        b.iter(|| {
            let geometry = GridGeometry::new(&sizes, &viewport);
            OverflowMap::compute(black_box(&grid), &geometry, &config, &mut measure)
        });
    });
}

fn bench_full_frame(c: &mut Criterion) {
    let mut state = GridState::new(ROWS, COLS, GridConfig::default()).expect("valid config");
    state.grid = populated_grid();
    let mut surface = RecordingSurface::new(MonospaceMeasure::new(7.0));
    state.resize(1600.0, 900.0, &mut MonospaceMeasure::new(7.0));

    c.bench_function("render_frame", |b| {
        b.iter(|| {
            surface.clear();
            state.invalidate_layout();
            state.render(&mut surface);
            black_box(surface.ops.len())
        });
    });
}

fn bench_compute_lines(c: &mut Criterion) {
    let mut measure = MonospaceMeasure::new(7.0);
    let mut group = c.benchmark_group("compute_lines");
    for chars in [50usize, 500, 5_000] {
        let text = "lorem ipsum dolor sit amet\n".repeat(chars / 27 + 1);
        group.bench_with_input(BenchmarkId::from_parameter(chars), &text, |b, text| {
            b.iter(|| compute_lines(black_box(text), true, 92.0, "11px sans-serif", &mut measure));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_visible_range,
    bench_overflow,
    bench_full_frame,
    bench_compute_lines
);
criterion_main!(benches);
