//! In-place cell text editor.
//!
//! The editor lays out, hit-tests and paints its own text (see
//! [`compute_lines`] and [`crate::render::paint_editor`]) with the same
//! metrics the grid renderer uses, so a cell looks identical while it is
//! being edited. [`CellEditor`] owns the focus lifecycle; one
//! [`EditorSession`] exists per open edit.

mod history;
mod keys;
mod lines;
mod session;

pub use history::EditHistory;
pub use keys::{handle_key, CommitMove, KeyInput, KeyOutcome};
pub use lines::{column_at_x, compute_lines, content_height, join_lines, line_at_cursor, Line};
pub use session::{EditorFrame, EditorSession, TextRange};

use log::debug;

use crate::config::GridConfig;
use crate::layout::{GridGeometry, HeaderSizes};
use crate::merge;
use crate::render::TextMeasure;
use crate::types::{CellPos, Grid};

/// Focus lifecycle around at most one [`EditorSession`].
#[derive(Debug, Default)]
pub struct CellEditor {
    session: Option<EditorSession>,
}

impl CellEditor {
    pub fn new() -> Self {
        Self::default()
    }

    fn frame_for(
        grid: &Grid,
        pos: CellPos,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
    ) -> Option<EditorFrame> {
        let cell = grid.get(pos)?;
        let rect = geometry.cell_rect(grid, pos);
        Some(EditorFrame::new(rect, &cell.style, config, geometry.zoom()))
    }

    /// Open the editor on `pos` (resolved to its merge anchor) with the
    /// cursor at the end of the value. Read-only and missing cells are
    /// refused. An already open session is replaced without committing;
    /// callers blur first.
    pub fn focus(
        &mut self,
        grid: &Grid,
        pos: CellPos,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
        measure: &mut dyn TextMeasure,
    ) -> bool {
        let anchor = merge::resolve_anchor(grid, pos);
        let Some(cell) = grid.get(anchor) else {
            return false;
        };
        if cell.read_only || anchor.is_header() {
            return false;
        }
        let Some(frame) = Self::frame_for(grid, anchor, geometry, config) else {
            return false;
        };
        debug!("editor focus ({}, {})", anchor.row, anchor.col);
        self.session = Some(EditorSession::new(anchor, &cell.value, frame, measure));
        true
    }

    /// Open the editor and replace the value, as when typing starts on a
    /// focused cell. Undo returns to the stored value.
    pub fn focus_with_value(
        &mut self,
        grid: &Grid,
        pos: CellPos,
        value: &str,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
        measure: &mut dyn TextMeasure,
    ) -> bool {
        if !self.focus(grid, pos, geometry, config, measure) {
            return false;
        }
        if let Some(session) = self.session.as_mut() {
            session.set_value(value, measure);
        }
        true
    }

    /// Commit the value to the grid and close the session. Unless the
    /// cell is merged, its row grows (never shrinks) to fit the content.
    /// Returns the committed cell.
    pub fn blur(&mut self, grid: &mut Grid, sizes: &mut HeaderSizes, zoom: f64) -> Option<CellPos> {
        let session = self.session.take()?;
        let pos = session.cell();
        if session.is_modified() {
            grid.set_value(pos, session.value());
        }
        if !merge::is_effectively_merged(grid, pos) {
            let needed = session.needed_row_height(zoom);
            if sizes.grow_row_height(pos.row, needed) {
                debug!("row {} grew to {needed:.1}px", pos.row);
            }
        }
        debug!("editor blur ({}, {})", pos.row, pos.col);
        Some(pos)
    }

    /// Close the session without writing anything back.
    pub fn cancel(&mut self) -> Option<CellPos> {
        let session = self.session.take()?;
        debug!("editor cancel ({}, {})", session.cell().row, session.cell().col);
        Some(session.cell())
    }

    /// Follow the cell after scroll, zoom, resize or a style change.
    pub fn reposition(
        &mut self,
        grid: &Grid,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
        measure: &mut dyn TextMeasure,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(frame) = Self::frame_for(grid, session.cell(), geometry, config) {
            session.set_frame(frame, measure);
        }
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditorSession> {
        self.session.as_mut()
    }

    pub fn editing_cell(&self) -> Option<CellPos> {
        self.session.as_ref().map(EditorSession::cell)
    }

    pub fn is_focused(&self) -> bool {
        self.session.is_some()
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
    use crate::layout::Viewport;
    use crate::render::MonospaceMeasure;
    use crate::types::{CellRange, CellStyle};

    struct Fixture {
        grid: Grid,
        sizes: HeaderSizes,
        viewport: Viewport,
        config: GridConfig,
        measure: MonospaceMeasure,
    }

    fn fixture() -> Fixture {
        let config = GridConfig::default();
        Fixture {
            grid: Grid::new(10, 6),
            sizes: HeaderSizes::new(10, 6, &config),
            viewport: Viewport::new(800.0, 600.0),
            config,
            measure: MonospaceMeasure::new(7.0),
        }
    }

    #[test]
    fn focus_resolves_merge_anchor_and_rejects_headers() {
        let mut f = fixture();
        f.grid.merge(CellRange { r1: 2, r2: 3, c1: 2, c2: 3 }).unwrap();
        f.grid.set_value(CellPos::new(2, 2), "merged");
        let geometry = GridGeometry::new(&f.sizes, &f.viewport);
        let mut editor = CellEditor::new();

        assert!(!editor.focus(&f.grid, CellPos::new(0, 2), &geometry, &f.config, &mut f.measure));
        assert!(editor.focus(&f.grid, CellPos::new(3, 3), &geometry, &f.config, &mut f.measure));
        let session = editor.session().unwrap();
        assert_eq!(session.cell(), CellPos::new(2, 2));
        assert_eq!(session.value(), "merged");
        assert_eq!(session.cursor(), 6);
        assert_eq!(session.frame().rect.width, 200.0);
    }

    #[test]
    fn blur_commits_and_grows_row() {
        let mut f = fixture();
        f.grid.set_style(
            CellPos::new(1, 1),
            CellStyle {
                wrap: true,
                ..CellStyle::default()
            },
        );
        let mut editor = CellEditor::new();
        {
            let geometry = GridGeometry::new(&f.sizes, &f.viewport);
            editor.focus(&f.grid, CellPos::new(1, 1), &geometry, &f.config, &mut f.measure);
        }
        // 92px interior fits 13 chars per line: 40 chars -> 4 lines
        editor
            .session_mut()
            .unwrap()
            .insert_text(&"x".repeat(40), &mut f.measure);
        let committed = editor.blur(&mut f.grid, &mut f.sizes, 1.0);
        assert_eq!(committed, Some(CellPos::new(1, 1)));
        assert_eq!(f.grid.value(CellPos::new(1, 1)).len(), 40);
        // 4 * 13.2 + 8
        assert!((f.sizes.row_height(1) - 60.8).abs() < 1e-9);
        assert!(!editor.is_focused());
    }

    #[test]
    fn blur_never_shrinks_and_skips_merged_rows() {
        let mut f = fixture();
        f.sizes.set_row_height(1, 80.0);
        f.grid.merge(CellRange { r1: 4, r2: 4, c1: 1, c2: 2 }).unwrap();
        let mut editor = CellEditor::new();
        {
            let geometry = GridGeometry::new(&f.sizes, &f.viewport);
            editor.focus(&f.grid, CellPos::new(1, 1), &geometry, &f.config, &mut f.measure);
        }
        editor.blur(&mut f.grid, &mut f.sizes, 1.0);
        assert_eq!(f.sizes.row_height(1), 80.0);

        {
            let geometry = GridGeometry::new(&f.sizes, &f.viewport);
            editor.focus(&f.grid, CellPos::new(4, 1), &geometry, &f.config, &mut f.measure);
        }
        editor
            .session_mut()
            .unwrap()
            .insert_text("a\nb\nc\nd", &mut f.measure);
        editor.blur(&mut f.grid, &mut f.sizes, 1.0);
        assert_eq!(f.sizes.row_height(4), 24.0);
        assert_eq!(f.grid.value(CellPos::new(4, 1)), "a\nb\nc\nd");
    }

    #[test]
    fn cancel_discards_edits() {
        let mut f = fixture();
        f.grid.set_value(CellPos::new(1, 1), "keep");
        let mut editor = CellEditor::new();
        {
            let geometry = GridGeometry::new(&f.sizes, &f.viewport);
            editor.focus_with_value(
                &f.grid,
                CellPos::new(1, 1),
                "x",
                &geometry,
                &f.config,
                &mut f.measure,
            );
        }
        assert_eq!(editor.session().unwrap().value(), "x");
        assert_eq!(editor.cancel(), Some(CellPos::new(1, 1)));
        assert_eq!(f.grid.value(CellPos::new(1, 1)), "keep");
    }

    #[test]
    fn read_only_cells_refuse_focus() {
        let mut f = fixture();
        f.grid.update_cell(CellPos::new(2, 2), |c| c.read_only = true);
        let geometry = GridGeometry::new(&f.sizes, &f.viewport);
        let mut editor = CellEditor::new();
        assert!(!editor.focus(&f.grid, CellPos::new(2, 2), &geometry, &f.config, &mut f.measure));
        assert_eq!(editor.editing_cell(), None);
    }
}
