//! Grid renderer.
//!
//! Stateless with respect to earlier frames: every call clears the surface
//! and redraws the visible region. Later steps overdraw earlier ones, which
//! is what keeps the frozen headers on top of scrolled content:
//!
//! 1. scrollable cells (backgrounds, grid lines, then text)
//! 2. selection outline
//! 3. focused-cell highlight
//! 4. frozen column 0
//! 5. frozen row 0 and the frozen separators
//! 6. corner cell with the "select all" glyph

use std::collections::BTreeSet;

use crate::config::GridConfig;
use crate::editor::compute_lines;
use crate::layout::{CellRect, GridGeometry};
use crate::merge;
use crate::types::{Cell, CellPos, Grid, HAlign, Selection, TextDecoration};

use super::colors::{palette, parse_color};
use super::overflow::OverflowMap;
use super::selection::{focus_outline, handle_rect, selection_outline};
use super::surface::{crisp, Surface, TextPaint};
use super::text::{anchor_x, decoration_y, first_line_center, line_left, CellFont};

/// Width of the selection outline and focus highlight.
const SELECTION_LINE_WIDTH: f64 = 2.0;

/// Everything one frame needs.
pub struct RenderParams<'a> {
    pub grid: &'a Grid,
    pub geometry: GridGeometry<'a>,
    pub config: &'a GridConfig,
    pub overflow: &'a OverflowMap,
    pub selection: Option<Selection>,
    pub focused: Option<CellPos>,
    /// The text editor is open and has keyboard focus.
    pub editor_focused: bool,
}

/// Draw one full frame.
pub fn render_grid(surface: &mut dyn Surface, params: &RenderParams<'_>) {
    let viewport = params.geometry.viewport;
    surface.begin_frame(viewport.width, viewport.height, &params.config.background);

    render_body(surface, params);

    if let Some(selection) = params.selection {
        render_selection(surface, params, &selection);
    }
    if let Some(focused) = params.focused {
        if let Some(rect) = focus_outline(
            params.grid,
            &params.geometry,
            focused,
            params.editor_focused,
        ) {
            surface.stroke_rect(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SELECTION_LINE_WIDTH,
                &params.config.selection_color,
            );
        }
    }

    render_frozen_column(surface, params);
    render_frozen_row(surface, params);
    render_corner(surface, params);
}

/// Cells to draw for the scrollable pane. Merge children map to their
/// anchor so a region whose anchor scrolled off-screen still draws, once.
fn body_targets(params: &RenderParams<'_>) -> BTreeSet<CellPos> {
    let rows = params.geometry.visible_rows();
    let cols = params.geometry.visible_cols();
    let mut targets = BTreeSet::new();
    for row in rows.start.max(1)..rows.end {
        for col in cols.start.max(1)..cols.end {
            targets.insert(merge::resolve_anchor(params.grid, CellPos::new(row, col)));
        }
    }
    targets
}

fn render_body(surface: &mut dyn Surface, params: &RenderParams<'_>) {
    let targets = body_targets(params);
    let cells: Vec<(&Cell, CellRect)> = targets
        .iter()
        .filter_map(|pos| {
            let cell = params.grid.get(*pos)?;
            Some((cell, params.geometry.cell_rect(params.grid, *pos)))
        })
        .collect();

    // Backgrounds first so a neighbour's fill never covers a grid line.
    for (cell, rect) in &cells {
        if let Some(bg) = cell.style.background.as_deref().and_then(parse_color) {
            surface.fill_rect(rect.x, rect.y, rect.width, rect.height, &bg);
        }
    }

    for (cell, rect) in &cells {
        render_cell_borders(surface, params, cell, rect);
    }

    // Text last: spilled text must not be painted over by the cells it
    // runs into.
    for (cell, rect) in &cells {
        render_cell_text(surface, params, cell, rect);
    }
    // Text of cells outside the view that runs into it. The frozen panes
    // painted afterwards cover the part left of column 1.
    for pos in params.overflow.offscreen_sources() {
        if let Some(cell) = params.grid.get(*pos) {
            let rect = params.geometry.cell_rect(params.grid, *pos);
            render_cell_text(surface, params, cell, &rect);
        }
    }
}

/// Right and bottom grid lines of a cell. Left and top lines belong to the
/// neighbour (or the frozen separator), so every line is stroked once.
fn render_cell_borders(
    surface: &mut dyn Surface,
    params: &RenderParams<'_>,
    cell: &Cell,
    rect: &CellRect,
) {
    if cell.merge_parent().is_some() {
        return;
    }
    let edges = params.overflow.edges(cell.pos());
    let color = cell
        .style
        .border_color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or_else(|| params.config.grid_line_color.clone());
    let right = crisp(rect.right());
    let bottom = crisp(rect.bottom());
    if !edges.right {
        surface.line((right, rect.y), (right, rect.bottom()), 1.0, &color);
    }
    if !edges.bottom {
        surface.line((rect.x, bottom), (rect.right(), bottom), 1.0, &color);
    }
}

fn render_cell_text(
    surface: &mut dyn Surface,
    params: &RenderParams<'_>,
    cell: &Cell,
    rect: &CellRect,
) {
    if cell.value.is_empty() {
        return;
    }
    let zoom = params.geometry.zoom();
    let padding = params.config.cell_padding * zoom;
    let spill = params.overflow.spill(cell.pos());
    let clip_width = rect.width - 2.0 * padding + spill.left + spill.right;
    if clip_width <= 0.0 {
        return;
    }

    let font = CellFont::resolve(&cell.style, params.config, zoom);
    let color = cell
        .style
        .color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or_else(|| params.config.font_color.clone());
    let lines: Vec<String> = if cell.style.wrap {
        let mut measure = &mut *surface;
        compute_lines(
            &cell.value,
            true,
            rect.width - 2.0 * padding,
            &font.css,
            &mut measure,
        )
        .into_iter()
        .map(|l| l.content)
        .collect()
    } else {
        cell.value.split('\n').map(str::to_string).collect()
    };

    surface.push_clip(
        rect.x + padding - spill.left,
        rect.y,
        clip_width,
        rect.height,
    );
    draw_text_block(
        surface,
        &lines,
        rect,
        padding,
        cell.style.align,
        &font,
        &color,
        cell.style.decoration,
    );
    surface.pop_clip();
}

/// Draw pre-split lines centred vertically in `rect`, with decoration.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_text_block(
    surface: &mut dyn Surface,
    lines: &[String],
    rect: &CellRect,
    padding: f64,
    align: HAlign,
    font: &CellFont,
    color: &str,
    decoration: TextDecoration,
) {
    let anchor = anchor_x(rect, padding, align);
    let first = first_line_center(rect, lines.len(), font.line_box);
    let paint = TextPaint {
        font: &font.css,
        color,
        align,
    };
    let mut y = first;
    for line in lines {
        surface.fill_text(line, anchor, y, &paint);
        if let Some(dy) = decoration_y(decoration, y, font.size_px) {
            let width = surface.measure(&font.css, line);
            if width > 0.0 {
                let left = line_left(anchor, align, width);
                let line_width = (font.size_px / 12.0).max(1.0);
                surface.line((left, dy), (left + width, dy), line_width, color);
            }
        }
        y += font.line_box;
    }
}

fn render_selection(surface: &mut dyn Surface, params: &RenderParams<'_>, selection: &Selection) {
    let Some(rect) = selection_outline(
        params.grid,
        &params.geometry,
        selection,
        params.editor_focused,
    ) else {
        return;
    };
    let config = params.config;
    surface.fill_rect(rect.x, rect.y, rect.width, rect.height, &config.selection_fill);
    surface.stroke_rect(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        SELECTION_LINE_WIDTH,
        &config.selection_color,
    );
    let handle = handle_rect(&rect);
    surface.fill_rect(
        handle.x,
        handle.y,
        handle.width,
        handle.height,
        &config.selection_color,
    );
    surface.fill_rect(
        handle.x + 1.5,
        handle.y + 1.5,
        handle.width - 3.0,
        handle.height - 3.0,
        palette::WHITE,
    );
}

/// Header cell: background (highlighted when covered by the selection)
/// plus its centred label. No per-cell grid lines.
fn render_header_cell(
    surface: &mut dyn Surface,
    params: &RenderParams<'_>,
    pos: CellPos,
    highlighted: bool,
) {
    let config = params.config;
    let rect = params.geometry.raw_cell_rect(pos);
    let background = if highlighted {
        &config.header_selected_background
    } else {
        &config.header_background
    };
    surface.fill_rect(rect.x, rect.y, rect.width, rect.height, background);

    let label = params.grid.value(pos);
    if label.is_empty() {
        return;
    }
    let size_px = config.font_size * params.geometry.zoom();
    let font = format!("{}px {}", size_px, config.font_family);
    let color = if highlighted {
        palette::HEADER_TEXT_SELECTED
    } else {
        config.header_text_color.as_str()
    };
    surface.fill_text(
        label,
        rect.x + rect.width / 2.0,
        rect.y + rect.height / 2.0,
        &TextPaint {
            font: &font,
            color,
            align: HAlign::Center,
        },
    );
}

fn render_frozen_column(surface: &mut dyn Surface, params: &RenderParams<'_>) {
    let rows = params.geometry.visible_rows();
    for row in rows.start.max(1)..rows.end {
        let highlighted = params.selection.is_some_and(|s| s.covers_row(row));
        render_header_cell(surface, params, CellPos::new(row, 0), highlighted);
    }
}

fn render_frozen_row(surface: &mut dyn Surface, params: &RenderParams<'_>) {
    let cols = params.geometry.visible_cols();
    for col in cols.start.max(1)..cols.end {
        let highlighted = params.selection.is_some_and(|s| s.covers_col(col));
        render_header_cell(surface, params, CellPos::new(0, col), highlighted);
    }

    let viewport = params.geometry.viewport;
    let frozen_width = params.geometry.frozen_width();
    let frozen_height = params.geometry.frozen_height();
    let color = &params.config.frozen_separator_color;
    let x = crisp(frozen_width);
    let y = crisp(frozen_height);
    surface.line((x, 0.0), (x, viewport.height), 1.0, color);
    surface.line((0.0, y), (viewport.width, y), 1.0, color);
}

fn render_corner(surface: &mut dyn Surface, params: &RenderParams<'_>) {
    let width = params.geometry.frozen_width();
    let height = params.geometry.frozen_height();
    surface.fill_rect(0.0, 0.0, width, height, &params.config.header_background);

    let inset = 3.0 * params.geometry.zoom();
    let size = width.min(height) * 0.4;
    let (x, y) = (width - inset, height - inset);
    surface.fill_polygon(
        &[(x, y), (x, y - size), (x - size, y)],
        palette::SELECT_ALL_GLYPH,
    );
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
    use crate::layout::{HeaderSizes, Viewport};
    use crate::render::{DrawOp, MonospaceMeasure, RecordingSurface};
    use crate::types::CellRange;

    struct Fixture {
        grid: Grid,
        sizes: HeaderSizes,
        viewport: Viewport,
        config: GridConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GridConfig::default();
            Self {
                grid: Grid::new(20, 10),
                sizes: HeaderSizes::new(20, 10, &config),
                viewport: Viewport::new(600.0, 300.0),
                config,
            }
        }

        fn render(&self, selection: Option<Selection>, editor_focused: bool) -> RecordingSurface {
            let geometry = GridGeometry::new(&self.sizes, &self.viewport);
            let mut surface = RecordingSurface::new(MonospaceMeasure::new(7.0));
            let overflow =
                OverflowMap::compute(&self.grid, &geometry, &self.config, &mut surface);
            let params = RenderParams {
                grid: &self.grid,
                geometry,
                config: &self.config,
                overflow: &overflow,
                selection,
                focused: selection.map(|s| s.start),
                editor_focused,
            };
            render_grid(&mut surface, &params);
            surface
        }
    }

    #[test]
    fn frame_starts_with_clear_and_balances_clips() {
        let mut fx = Fixture::new();
        fx.grid.set_value(CellPos::new(1, 1), "hello");
        let surface = fx.render(None, false);
        assert!(matches!(surface.ops[0], DrawOp::BeginFrame { .. }));
        assert!(surface.clips_balanced());
        assert!(surface.text_index("hello").is_some());
    }

    #[test]
    fn headers_draw_after_body() {
        let mut fx = Fixture::new();
        fx.grid.set_value(CellPos::new(1, 1), "body");
        let surface = fx.render(None, false);
        let body = surface.text_index("body").unwrap();
        let row_label = surface.text_index("1").unwrap();
        let col_label = surface.text_index("A").unwrap();
        assert!(body < row_label);
        assert!(row_label < col_label);
        let corner = surface
            .position(|op| matches!(op, DrawOp::Polygon { .. }))
            .unwrap();
        assert!(corner > col_label);
    }

    #[test]
    fn merged_region_draws_once_from_anchor() {
        let mut fx = Fixture::new();
        fx.grid.set_value(CellPos::new(2, 2), "merged");
        fx.grid.merge(CellRange { r1: 2, r2: 3, c1: 2, c2: 4 }).unwrap();
        let surface = fx.render(None, false);
        assert_eq!(surface.texts().iter().filter(|t| **t == "merged").count(), 1);
    }

    #[test]
    fn merged_anchor_off_screen_still_draws() {
        let mut fx = Fixture::new();
        fx.grid.set_value(CellPos::new(1, 1), "wide");
        fx.grid.merge(CellRange { r1: 1, r2: 1, c1: 1, c2: 4 }).unwrap();
        // scroll so column 1 is off-screen but columns 2..4 are visible
        fx.viewport.set_scroll(150.0, 0.0, &fx.sizes);
        let surface = fx.render(None, false);
        assert!(surface.text_index("wide").is_some());
    }

    #[test]
    fn single_cell_selection_hidden_while_editing() {
        let fx = Fixture::new();
        let sel = Selection::single(CellPos::new(2, 2));
        let strokes = |s: &RecordingSurface| {
            s.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::StrokeRect { .. }))
                .count()
        };
        // outline + focus highlight
        assert_eq!(strokes(&fx.render(Some(sel), false)), 2);
        assert_eq!(strokes(&fx.render(Some(sel), true)), 0);
        let multi = Selection::new(CellPos::new(2, 2), CellPos::new(3, 3));
        // the multi-cell outline survives, the focus highlight does not
        assert_eq!(strokes(&fx.render(Some(multi), true)), 1);
    }

    #[test]
    fn selected_headers_are_highlighted() {
        let fx = Fixture::new();
        let sel = Selection::new(CellPos::new(2, 2), CellPos::new(3, 2));
        let surface = fx.render(Some(sel), false);
        let highlighted = surface
            .ops
            .iter()
            .filter(|op| {
                matches!(op, DrawOp::FillRect { color, .. } if *color == fx.config.header_selected_background)
            })
            .count();
        // rows 2, 3 and column 2
        assert_eq!(highlighted, 3);
    }

    #[test]
    fn overflowing_text_hides_crossed_grid_line() {
        let mut fx = Fixture::new();
        // 20 chars = 140px in a 100px column
        fx.grid.set_value(CellPos::new(1, 1), "abcdefghijklmnopqrst");
        let surface = fx.render(None, false);
        let col1_right = crisp(148.0);
        let col2_right = crisp(248.0);
        let vertical_at = |x: f64| {
            surface.lines_with_color(&fx.config.grid_line_color).any(|op| {
                matches!(op, DrawOp::Line { from, to, .. }
                    if from.0 == x && to.0 == x && from.1 == 24.0)
            })
        };
        assert!(!vertical_at(col1_right));
        assert!(vertical_at(col2_right));
    }

    #[test]
    fn underline_follows_alignment() {
        let mut fx = Fixture::new();
        fx.grid.set_value(CellPos::new(1, 1), "abc");
        fx.grid.update_cell(CellPos::new(1, 1), |c| {
            c.style.decoration = TextDecoration::Underline;
            c.style.align = HAlign::Right;
        });
        let surface = fx.render(None, false);
        let text_color = fx.config.font_color.clone();
        let underline = surface
            .lines_with_color(&text_color)
            .find_map(|op| match op {
                DrawOp::Line { from, to, .. } => Some((from.0, to.0)),
                _ => None,
            })
            .unwrap();
        // right edge 148 - padding 4 = 144, text 21px wide
        assert_eq!(underline, (123.0, 144.0));
    }

    #[test]
    fn wrapped_text_draws_each_soft_line() {
        let mut fx = Fixture::new();
        fx.grid.set_value(CellPos::new(1, 1), &"x".repeat(26));
        fx.grid.update_cell(CellPos::new(1, 1), |c| c.style.wrap = true);
        let surface = fx.render(None, false);
        // interior 92px = 13 chars per line
        assert_eq!(
            surface.texts().iter().filter(|t| **t == "x".repeat(13)).count(),
            2
        );
    }
}
