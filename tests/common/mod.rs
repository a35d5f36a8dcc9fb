//! Common test utilities: grid fixtures and headless measuring.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use sheetgrid::layout::{GridGeometry, HeaderSizes, Viewport};
use sheetgrid::render::{MonospaceMeasure, RecordingSurface};
use sheetgrid::{CellPos, CellRange, CellStyle, Grid, GridConfig, GridState};

/// Width of one character for every fixture measurer.
pub const CHAR_WIDTH: f64 = 7.0;

pub fn measure() -> MonospaceMeasure {
    MonospaceMeasure::new(CHAR_WIDTH)
}

pub fn recording_surface() -> RecordingSurface {
    RecordingSurface::new(measure())
}

// ============================================================================
// Grid builder
// ============================================================================

/// Fluent builder for a grid plus its size tables.
///
/// Defaults: header column 48px, data columns 100px, all rows 24px.
pub struct GridBuilder {
    rows: u32,
    cols: u32,
    config: GridConfig,
    values: Vec<(CellPos, String)>,
    styles: Vec<(CellPos, CellStyle)>,
    merges: Vec<CellRange>,
    col_widths: Vec<(u32, f64)>,
    row_heights: Vec<(u32, f64)>,
}

impl GridBuilder {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            config: GridConfig::default(),
            values: Vec::new(),
            styles: Vec::new(),
            merges: Vec::new(),
            col_widths: Vec::new(),
            row_heights: Vec::new(),
        }
    }

    pub fn value(mut self, row: u32, col: u32, value: &str) -> Self {
        self.values.push((CellPos::new(row, col), value.to_string()));
        self
    }

    pub fn style(mut self, row: u32, col: u32, style: CellStyle) -> Self {
        self.styles.push((CellPos::new(row, col), style));
        self
    }

    pub fn wrapped(self, row: u32, col: u32) -> Self {
        self.style(
            row,
            col,
            CellStyle {
                wrap: true,
                ..CellStyle::default()
            },
        )
    }

    pub fn merge(mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> Self {
        self.merges.push(CellRange { r1, r2, c1, c2 });
        self
    }

    pub fn col_width(mut self, col: u32, width: f64) -> Self {
        self.col_widths.push((col, width));
        self
    }

    pub fn row_height(mut self, row: u32, height: f64) -> Self {
        self.row_heights.push((row, height));
        self
    }

    pub fn build(self) -> (Grid, HeaderSizes) {
        let mut grid = Grid::new(self.rows, self.cols);
        for (pos, style) in self.styles {
            grid.set_style(pos, style);
        }
        for (pos, value) in self.values {
            grid.set_value(pos, &value);
        }
        for range in self.merges {
            grid.merge(range).expect("fixture merge");
        }
        let mut sizes = HeaderSizes::new(self.rows, self.cols, &self.config);
        for (col, width) in self.col_widths {
            sizes.set_col_width(col, width);
        }
        for (row, height) in self.row_heights {
            sizes.set_row_height(row, height);
        }
        (grid, sizes)
    }

    /// Build straight into a [`GridState`] sized `width × height`.
    pub fn state(self, width: f64, height: f64) -> GridState {
        let config = self.config.clone();
        let (grid, sizes) = self.build();
        let mut state = GridState::new(grid.rows(), grid.cols(), config).expect("valid config");
        state.grid = grid;
        state.sizes = sizes;
        state.resize(width, height, &mut measure());
        state
    }
}

/// Geometry over `sizes` for a viewport at the origin.
pub fn geometry<'a>(sizes: &'a HeaderSizes, viewport: &'a Viewport) -> GridGeometry<'a> {
    GridGeometry::new(sizes, viewport)
}

/// Viewport point at the centre of a data cell, for the default sizes and
/// no scrolling.
pub fn cell_center(sizes: &HeaderSizes, row: u32, col: u32) -> (f64, f64) {
    (
        sizes.col_position(col) + sizes.col_width(col) / 2.0,
        sizes.row_position(row) + sizes.row_height(row) / 2.0,
    )
}
