//! Paints the open text editor onto its own surface.
//!
//! Coordinates are editor-local. Text goes through the same
//! [`draw_text_block`] as the grid, so the edited cell does not shift when
//! the editor opens or closes.

use crate::config::GridConfig;
use crate::editor::EditorSession;

use super::grid_renderer::draw_text_block;
use super::surface::{crisp, Surface};

/// Width of the editor's border stroke.
pub const EDITOR_BORDER_WIDTH: f64 = 2.0;

/// Draw one editor frame: background, text selection, text, caret, then
/// the border on top.
pub fn paint_editor(
    surface: &mut dyn Surface,
    session: &EditorSession,
    config: &GridConfig,
    caret_visible: bool,
) {
    let frame = session.frame();
    let rect = session.local_rect();
    surface.begin_frame(rect.width, rect.height, &frame.background);

    {
        let mut measure = &mut *surface;
        let highlights = session.selection_rects(&mut measure);
        for r in highlights {
            surface.fill_rect(r.x, r.y, r.width, r.height, &config.text_selection_color);
        }
    }

    let lines: Vec<String> = session.lines().iter().map(|l| l.content.clone()).collect();
    draw_text_block(
        surface,
        &lines,
        &rect,
        frame.padding,
        frame.align,
        &frame.font,
        &frame.color,
        frame.decoration,
    );

    if caret_visible && session.selection().filter(|s| !s.is_empty()).is_none() {
        let (x, top, height) = {
            let mut measure = &mut *surface;
            session.caret_geometry(&mut measure)
        };
        let x = crisp(x);
        surface.line((x, top), (x, top + height), 1.0, &config.caret_color);
    }

    surface.stroke_rect(
        EDITOR_BORDER_WIDTH / 2.0,
        EDITOR_BORDER_WIDTH / 2.0,
        rect.width - EDITOR_BORDER_WIDTH,
        rect.height - EDITOR_BORDER_WIDTH,
        EDITOR_BORDER_WIDTH,
        &config.editor_border_color,
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
    use crate::editor::EditorFrame;
    use crate::layout::CellRect;
    use crate::render::{DrawOp, MonospaceMeasure, RecordingSurface};
    use crate::types::{CellPos, CellStyle};

    fn session(value: &str, wrap: bool) -> EditorSession {
        let mut m = MonospaceMeasure::new(7.0);
        let style = CellStyle {
            wrap,
            ..CellStyle::default()
        };
        let rect = CellRect {
            x: 148.0,
            y: 48.0,
            width: 78.0,
            height: 24.0,
        };
        let frame = EditorFrame::new(rect, &style, &GridConfig::default(), 1.0);
        EditorSession::new(CellPos::new(2, 2), value, frame, &mut m)
    }

    #[test]
    fn paints_background_text_caret_then_border() {
        let config = GridConfig::default();
        let s = session("abc", false);
        let mut surface = RecordingSurface::new(MonospaceMeasure::new(7.0));
        paint_editor(&mut surface, &s, &config, true);

        assert!(matches!(
            &surface.ops[0],
            DrawOp::BeginFrame { width, background, .. } if *width == 78.0 && background == "#FFFFFF"
        ));
        let text = surface.text_index("abc").unwrap();
        let caret = surface
            .position(|op| matches!(op, DrawOp::Line { color, .. } if *color == config.caret_color))
            .unwrap();
        assert!(text < caret);
        // caret after 3 chars: 4 + 21
        match &surface.ops[caret] {
            DrawOp::Line { from, .. } => assert_eq!(from.0, 25.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            surface.ops.last().unwrap(),
            DrawOp::StrokeRect { line_width, .. } if *line_width == EDITOR_BORDER_WIDTH
        ));
    }

    #[test]
    fn selection_highlight_replaces_caret() {
        let config = GridConfig::default();
        let mut s = session("abc", false);
        s.select_all();
        let mut surface = RecordingSurface::new(MonospaceMeasure::new(7.0));
        paint_editor(&mut surface, &s, &config, true);
        let fill = surface
            .position(|op| matches!(op, DrawOp::FillRect { color, w, .. } if *color == config.text_selection_color && *w == 21.0))
            .unwrap();
        assert!(fill < surface.text_index("abc").unwrap());
        assert_eq!(surface.lines_with_color(&config.caret_color).count(), 0);
    }

    #[test]
    fn surface_grows_with_wrapped_content() {
        let config = GridConfig::default();
        let s = session(&"x".repeat(30), true);
        let mut surface = RecordingSurface::new(MonospaceMeasure::new(7.0));
        paint_editor(&mut surface, &s, &config, false);
        assert_eq!(surface.texts().len(), 3);
        match &surface.ops[0] {
            DrawOp::BeginFrame { height, .. } => assert!((height - 47.6).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
    }
}
