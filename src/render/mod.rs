//! Rendering: the drawing surface abstraction, the grid renderer, the
//! overflow border pass and the editor painter.
//!
//! This module provides:
//! - `Surface` / `TextMeasure` traits with a Canvas 2D backend (wasm32) and
//!   a recording backend for headless tests
//! - Text metrics caching
//! - Color parsing utilities

pub mod colors;
mod editor_painter;
mod grid_renderer;
mod measure;
mod overflow;
mod recording;
pub mod selection;
mod surface;
mod text;

#[cfg(target_arch = "wasm32")]
mod canvas_surface;

pub use colors::{palette, parse_color, CssColor};
pub use editor_painter::{paint_editor, EDITOR_BORDER_WIDTH};
pub use grid_renderer::{render_grid, RenderParams};
pub use measure::{
    font_px, CachedMeasure, MonospaceMeasure, TextMeasureCache, TEXT_MEASURE_CACHE_CAP,
};
pub use overflow::{HiddenEdges, OverflowCache, OverflowMap, Spill};
pub use recording::{DrawOp, RecordingSurface};
pub use surface::{crisp, Surface, TextMeasure, TextPaint, CRISP_OFFSET};
pub use text::{anchor_x, decoration_y, first_line_center, line_left, CellFont};

#[cfg(target_arch = "wasm32")]
pub use canvas_surface::CanvasSurface;
