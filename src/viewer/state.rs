//! `GridState`: the explicit context object every component works through.
//!
//! It owns the grid, the size tables, the viewport, the selection
//! controller and the text editor, and turns host events (pointer, keys,
//! clipboard text) into calls on them. Nothing here touches the DOM, so
//! the whole interaction model runs headless in tests; the wasm widget
//! only forwards events and paints.

use log::{debug, warn};

use crate::config::GridConfig;
use crate::editor::{handle_key, CellEditor, CommitMove, KeyInput, KeyOutcome};
use crate::error::{Result, SheetError};
use crate::layout::{GridGeometry, HeaderSizes, Viewport};
use crate::merge;
use crate::render::{paint_editor, render_grid, OverflowCache, RenderParams, Surface, TextMeasure};
use crate::selection::{
    copy_selection, cut_selection, hit_test, paste_table, ClipboardTable, Direction, HitTarget,
    PointerDown, PointerUp, SelectionController,
};
use crate::types::{CellPos, CellRange, CellStyle, Grid};

/// What the host must do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResponse {
    /// Not ours; let the browser have it.
    Ignored,
    /// Consumed; prevent the default action.
    Handled,
    /// Consumed; write this text to the system clipboard.
    WriteClipboard(String),
    /// Consumed; read the system clipboard and pass it to
    /// [`GridState::paste_text`].
    ReadClipboard,
}

#[derive(Debug)]
pub struct GridState {
    pub grid: Grid,
    pub sizes: HeaderSizes,
    pub viewport: Viewport,
    pub config: GridConfig,
    pub selection: SelectionController,
    pub editor: CellEditor,
    overflow: OverflowCache,
    /// Last table copied from this grid; keeps styles when the same text
    /// comes back from the system clipboard.
    clipboard: Option<ClipboardTable>,
    editor_dragging: bool,
    /// Grid surface must be repainted.
    pub needs_render: bool,
    /// Editor surface must be repainted.
    pub needs_editor_render: bool,
}

impl GridState {
    /// A `rows × cols` grid (headers included) with the given defaults.
    pub fn new(rows: u32, cols: u32, config: GridConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(rows, cols);
        let sizes = HeaderSizes::new(grid.rows(), grid.cols(), &config);
        Ok(Self {
            grid,
            sizes,
            viewport: Viewport::default(),
            config,
            selection: SelectionController::new(),
            editor: CellEditor::new(),
            overflow: OverflowCache::new(),
            clipboard: None,
            editor_dragging: false,
            needs_render: true,
            needs_editor_render: false,
        })
    }

    pub fn geometry(&self) -> GridGeometry<'_> {
        GridGeometry::new(&self.sizes, &self.viewport)
    }

    pub fn invalidate(&mut self) {
        self.needs_render = true;
        self.needs_editor_render = self.editor.is_focused();
    }

    /// Overflow data must be rebuilt (config or fonts changed).
    pub fn invalidate_layout(&mut self) {
        self.overflow.invalidate();
        self.invalidate();
    }

    /// How many times the overflow map has been rebuilt.
    pub fn overflow_recomputes(&self) -> u64 {
        self.overflow.recomputes()
    }

    // ===== Painting =====

    /// Paint the grid surface.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let geometry = GridGeometry::new(&self.sizes, &self.viewport);
        let overflow = {
            let mut measure = &mut *surface;
            self.overflow
                .get(&self.grid, &geometry, &self.config, &mut measure)
        };
        let params = RenderParams {
            grid: &self.grid,
            geometry,
            config: &self.config,
            overflow,
            selection: self.selection.selection(),
            focused: self.selection.focused(),
            editor_focused: self.editor.is_focused(),
        };
        render_grid(surface, &params);
        self.needs_render = false;
    }

    /// Paint the editor surface. Returns false when no editor is open.
    pub fn render_editor(&mut self, surface: &mut dyn Surface, caret_visible: bool) -> bool {
        self.needs_editor_render = false;
        match self.editor.session() {
            Some(session) => {
                paint_editor(surface, session, &self.config, caret_visible);
                true
            }
            None => false,
        }
    }

    // ===== Viewport =====

    fn sync_editor(&mut self, measure: &mut dyn TextMeasure) {
        let geometry = GridGeometry::new(&self.sizes, &self.viewport);
        self.editor
            .reposition(&self.grid, &geometry, &self.config, measure);
        self.invalidate();
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64, measure: &mut dyn TextMeasure) -> bool {
        let (ax, ay) = self.viewport.scroll_by(dx, dy, &self.sizes);
        let moved = ax != 0.0 || ay != 0.0;
        if moved {
            self.sync_editor(measure);
        }
        moved
    }

    pub fn set_scroll(&mut self, x: f64, y: f64, measure: &mut dyn TextMeasure) {
        self.viewport.set_scroll(x, y, &self.sizes);
        self.sync_editor(measure);
    }

    pub fn set_zoom(&mut self, zoom: f64, measure: &mut dyn TextMeasure) {
        self.viewport.set_zoom(zoom, &self.sizes);
        self.sync_editor(measure);
    }

    pub fn resize(&mut self, width: f64, height: f64, measure: &mut dyn TextMeasure) {
        self.viewport.resize(width, height, &self.sizes);
        self.sync_editor(measure);
    }

    fn scroll_into_view(&mut self, range: CellRange) {
        if self.viewport.scroll_into_view(&self.sizes, range) {
            self.needs_render = true;
        }
    }

    // ===== Editing lifecycle =====

    /// Open the editor on `pos`, scrolling it into view first.
    pub fn open_editor(&mut self, pos: CellPos, measure: &mut dyn TextMeasure) -> bool {
        self.open_editor_with(pos, None, measure)
    }

    fn open_editor_with(
        &mut self,
        pos: CellPos,
        value: Option<&str>,
        measure: &mut dyn TextMeasure,
    ) -> bool {
        if self.editor.is_focused() {
            self.commit_edit();
        }
        if !self.grid.in_bounds(pos) {
            return false;
        }
        let anchor = merge::resolve_anchor(&self.grid, pos);
        self.scroll_into_view(merge::footprint_rect(&self.grid, anchor));
        let geometry = GridGeometry::new(&self.sizes, &self.viewport);
        let opened = match value {
            Some(value) => self.editor.focus_with_value(
                &self.grid,
                anchor,
                value,
                &geometry,
                &self.config,
                measure,
            ),
            None => self
                .editor
                .focus(&self.grid, anchor, &geometry, &self.config, measure),
        };
        if opened {
            self.selection.select_cell(&self.grid, anchor);
            self.invalidate();
        }
        opened
    }

    /// Commit the open edit (if any) back into the grid.
    pub fn commit_edit(&mut self) -> Option<CellPos> {
        let committed = self
            .editor
            .blur(&mut self.grid, &mut self.sizes, self.viewport.zoom)?;
        self.viewport.clamp_scroll(&self.sizes);
        self.editor_dragging = false;
        self.needs_render = true;
        self.needs_editor_render = false;
        Some(committed)
    }

    /// Close the editor without writing back.
    pub fn cancel_edit(&mut self) -> Option<CellPos> {
        let cancelled = self.editor.cancel()?;
        self.editor_dragging = false;
        self.needs_render = true;
        self.needs_editor_render = false;
        Some(cancelled)
    }

    /// Replace the open editor's value (host formula bar and the like).
    pub fn set_editor_value(&mut self, text: &str, measure: &mut dyn TextMeasure) -> bool {
        let Some(session) = self.editor.session_mut() else {
            return false;
        };
        session.set_value(text, measure);
        self.needs_editor_render = true;
        true
    }

    // ===== Grid pointer events (viewport coordinates) =====

    /// Pointer pressed on the grid surface. Clicking the grid closes an
    /// open editor, committing its value.
    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool) -> PointerDown {
        if self.editor.is_focused() {
            self.commit_edit();
        }
        let outcome =
            self.selection
                .pointer_down(&self.grid, &self.sizes, &self.viewport, x, y, shift);
        if outcome != PointerDown::Ignored {
            self.needs_render = true;
        }
        outcome
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let changed = self
            .selection
            .pointer_move(&self.grid, &mut self.sizes, &self.viewport, x, y);
        if changed {
            self.needs_render = true;
        }
        changed
    }

    pub fn pointer_up(&mut self) -> PointerUp {
        let outcome = self.selection.pointer_up();
        if outcome == PointerUp::ResizeEnded {
            self.viewport.clamp_scroll(&self.sizes);
            self.needs_render = true;
        }
        outcome
    }

    /// Cell (merge anchor) under a double click, if any.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<CellPos> {
        match hit_test(&self.geometry(), x, y) {
            HitTarget::Cell(pos) => Some(merge::resolve_anchor(&self.grid, pos)),
            _ => None,
        }
    }

    // ===== Editor pointer events (editor-local coordinates) =====

    pub fn editor_pointer_down(&mut self, x: f64, y: f64, shift: bool, measure: &mut dyn TextMeasure) {
        if let Some(session) = self.editor.session_mut() {
            session.place_cursor(x, y, shift, measure);
            self.editor_dragging = true;
            self.needs_editor_render = true;
        }
    }

    /// Extend the text selection while the caret drag is active. Returns
    /// whether the caret or selection moved.
    pub fn editor_pointer_move(&mut self, x: f64, y: f64, measure: &mut dyn TextMeasure) -> bool {
        if !self.editor_dragging {
            return false;
        }
        let Some(session) = self.editor.session_mut() else {
            return false;
        };
        let before = (session.cursor(), session.selection());
        session.place_cursor(x, y, true, measure);
        let changed = before != (session.cursor(), session.selection());
        if changed {
            self.needs_editor_render = true;
        }
        changed
    }

    pub fn editor_pointer_up(&mut self) {
        self.editor_dragging = false;
    }

    pub fn is_editor_dragging(&self) -> bool {
        self.editor_dragging
    }

    pub fn editor_double_click(&mut self, x: f64, y: f64, measure: &mut dyn TextMeasure) {
        if let Some(session) = self.editor.session_mut() {
            session.select_word_at(x, y, measure);
            self.needs_editor_render = true;
        }
    }

    // ===== Keyboard =====

    pub fn key_down(&mut self, input: &KeyInput, measure: &mut dyn TextMeasure) -> KeyResponse {
        if self.editor.is_focused() {
            self.editor_key(input, measure)
        } else {
            self.grid_key(input, measure)
        }
    }

    fn editor_key(&mut self, input: &KeyInput, measure: &mut dyn TextMeasure) -> KeyResponse {
        let Some(session) = self.editor.session_mut() else {
            return KeyResponse::Ignored;
        };
        match handle_key(session, input, measure) {
            KeyOutcome::Handled => {
                self.needs_editor_render = true;
                KeyResponse::Handled
            }
            KeyOutcome::Ignored => KeyResponse::Ignored,
            KeyOutcome::Swallowed => KeyResponse::Handled,
            KeyOutcome::Copy(text) => KeyResponse::WriteClipboard(text),
            KeyOutcome::Cut(text) => {
                self.needs_editor_render = true;
                KeyResponse::WriteClipboard(text)
            }
            KeyOutcome::Paste => KeyResponse::ReadClipboard,
            KeyOutcome::Commit(direction) => {
                self.commit_edit();
                let direction = match direction {
                    CommitMove::Down => Direction::Down,
                    CommitMove::Up => Direction::Up,
                    CommitMove::Right => Direction::Right,
                    CommitMove::Left => Direction::Left,
                };
                self.move_focus(direction, false);
                KeyResponse::Handled
            }
            KeyOutcome::Cancel => {
                self.cancel_edit();
                KeyResponse::Handled
            }
        }
    }

    fn move_focus(&mut self, direction: Direction, extend: bool) {
        if let Some(range) = self.selection.move_focus(&self.grid, direction, extend) {
            self.scroll_into_view(range);
        }
        self.needs_render = true;
    }

    fn selected_range(&self) -> Option<CellRange> {
        self.selection
            .selection()
            .map(|s| s.absolute())
            .or_else(|| self.selection.focused().map(CellRange::single))
    }

    fn grid_key(&mut self, input: &KeyInput, measure: &mut dyn TextMeasure) -> KeyResponse {
        if input.command() {
            return match input.key.to_ascii_lowercase().as_str() {
                "c" => self.copy().map_or(KeyResponse::Handled, KeyResponse::WriteClipboard),
                "x" => self.cut().map_or(KeyResponse::Handled, KeyResponse::WriteClipboard),
                "v" => KeyResponse::ReadClipboard,
                "a" => {
                    self.selection.select_all(&self.grid);
                    self.needs_render = true;
                    KeyResponse::Handled
                }
                _ => KeyResponse::Ignored,
            };
        }
        if let Some(direction) = Direction::from_key(&input.key, input.shift) {
            let extend = input.shift && input.key.starts_with("Arrow");
            self.move_focus(direction, extend);
            return KeyResponse::Handled;
        }
        let Some(focused) = self.selection.focused() else {
            return KeyResponse::Ignored;
        };
        match input.key.as_str() {
            "F2" => {
                self.open_editor(focused, measure);
                KeyResponse::Handled
            }
            "Delete" | "Backspace" => {
                if let Some(range) = self.selected_range() {
                    if self.grid.clear_values(range) > 0 {
                        self.needs_render = true;
                    }
                }
                KeyResponse::Handled
            }
            _ => match input.text_char() {
                Some(c) => {
                    let mut buf = [0u8; 4];
                    if self.open_editor_with(focused, Some(&*c.encode_utf8(&mut buf)), measure) {
                        KeyResponse::Handled
                    } else {
                        KeyResponse::Ignored
                    }
                }
                None => KeyResponse::Ignored,
            },
        }
    }

    // ===== Clipboard =====

    /// Copy the selected cells; returns their TSV text.
    pub fn copy(&mut self) -> Option<String> {
        let range = self.selected_range()?;
        let table = copy_selection(&self.grid, range);
        let text = table.to_tsv();
        self.clipboard = Some(table);
        Some(text)
    }

    /// Copy, then clear the selected cells.
    pub fn cut(&mut self) -> Option<String> {
        let range = self.selected_range()?;
        let table = cut_selection(&mut self.grid, range);
        let text = table.to_tsv();
        self.clipboard = Some(table);
        self.needs_render = true;
        Some(text)
    }

    /// Apply clipboard text: into the editor when one is open, otherwise
    /// as a table at the selection's top-left.
    pub fn paste_text(&mut self, text: &str, measure: &mut dyn TextMeasure) -> bool {
        if let Some(session) = self.editor.session_mut() {
            let changed = session.insert_text(text, measure);
            self.needs_editor_render = true;
            return changed;
        }
        let Some(range) = self.selected_range() else {
            return false;
        };
        let table = match &self.clipboard {
            Some(table) if table.to_tsv() == text.trim_end_matches(['\r', '\n']) => table.clone(),
            _ => ClipboardTable::from_tsv(text),
        };
        let at = range.top_left();
        match paste_table(&mut self.grid, at, &table) {
            Some(covered) => {
                self.selection.select_range(
                    &self.grid,
                    covered.top_left(),
                    CellPos::new(covered.r2, covered.c2),
                );
                self.needs_render = true;
                true
            }
            None => false,
        }
    }

    /// A clipboard read or write failed; nothing changes.
    pub fn clipboard_failed(&self, error: &SheetError) {
        warn!("paste/copy skipped: {error}");
    }

    // ===== Host data access =====

    fn checked(&self, row: u32, col: u32) -> Result<CellPos> {
        let pos = CellPos::new(row, col);
        if self.grid.in_bounds(pos) {
            Ok(pos)
        } else {
            Err(SheetError::OutOfRange { row, col })
        }
    }

    pub fn cell_value(&self, row: u32, col: u32) -> Result<String> {
        let pos = self.checked(row, col)?;
        Ok(self.grid.value(pos).to_string())
    }

    pub fn set_cell_value(&mut self, row: u32, col: u32, value: &str) -> Result<()> {
        let pos = self.checked(row, col)?;
        self.grid.set_value(pos, value);
        self.needs_render = true;
        Ok(())
    }

    pub fn set_cell_style(
        &mut self,
        row: u32,
        col: u32,
        style: CellStyle,
        measure: &mut dyn TextMeasure,
    ) -> Result<()> {
        let pos = self.checked(row, col)?;
        self.grid.set_style(pos, style);
        self.sync_editor(measure);
        Ok(())
    }

    pub fn merge_cells(&mut self, range: CellRange) -> Result<()> {
        if self.editor.is_focused() {
            self.commit_edit();
        }
        self.grid.merge(range)?;
        if let Some(selection) = self.selection.selection() {
            self.selection
                .select_range(&self.grid, selection.start, selection.end);
        }
        self.needs_render = true;
        Ok(())
    }

    pub fn unmerge_cells(&mut self, row: u32, col: u32) -> Result<CellRange> {
        let pos = self.checked(row, col)?;
        if self.editor.is_focused() {
            self.commit_edit();
        }
        let span = self.grid.unmerge(pos)?;
        self.needs_render = true;
        debug!("unmerged at ({row}, {col})");
        Ok(span)
    }

    /// Style of the focused cell, for toolbar state.
    pub fn focused_style(&self) -> Option<&CellStyle> {
        let pos = self.selection.focused()?;
        self.grid.get(pos).map(|c| &c.style)
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
    use crate::render::{MonospaceMeasure, RecordingSurface};

    fn state() -> (GridState, MonospaceMeasure) {
        let mut s = GridState::new(30, 12, GridConfig::default()).unwrap();
        let mut m = MonospaceMeasure::new(7.0);
        s.resize(600.0, 300.0, &mut m);
        (s, m)
    }

    fn press(s: &mut GridState, m: &mut MonospaceMeasure, key: KeyInput) -> KeyResponse {
        s.key_down(&key, m)
    }

    #[test]
    fn typing_on_focused_cell_opens_editor_and_enter_commits() {
        let (mut s, mut m) = state();
        s.selection.select_cell(&s.grid, CellPos::new(2, 2));
        s.set_cell_value(2, 2, "old").unwrap();
        assert_eq!(press(&mut s, &mut m, KeyInput::new("h")), KeyResponse::Handled);
        assert_eq!(s.editor.editing_cell(), Some(CellPos::new(2, 2)));
        press(&mut s, &mut m, KeyInput::new("i"));
        press(&mut s, &mut m, KeyInput::new("Enter"));
        assert_eq!(s.grid.value(CellPos::new(2, 2)), "hi");
        assert!(!s.editor.is_focused());
        assert_eq!(s.selection.focused(), Some(CellPos::new(3, 2)));
    }

    #[test]
    fn escape_keeps_original_value() {
        let (mut s, mut m) = state();
        s.set_cell_value(1, 1, "keep").unwrap();
        s.selection.select_cell(&s.grid, CellPos::new(1, 1));
        press(&mut s, &mut m, KeyInput::new("F2"));
        press(&mut s, &mut m, KeyInput::new("Backspace"));
        assert_eq!(s.editor.session().unwrap().value(), "kee");
        press(&mut s, &mut m, KeyInput::new("Escape"));
        assert_eq!(s.grid.value(CellPos::new(1, 1)), "keep");
        assert_eq!(s.selection.focused(), Some(CellPos::new(1, 1)));
    }

    #[test]
    fn arrows_scroll_focus_into_view() {
        let (mut s, mut m) = state();
        s.selection.select_cell(&s.grid, CellPos::new(1, 1));
        for _ in 0..6 {
            press(&mut s, &mut m, KeyInput::new("ArrowRight"));
        }
        assert_eq!(s.selection.focused(), Some(CellPos::new(1, 7)));
        // column 7 ends at 48 + 700 = 748; viewport is 600 wide
        assert_eq!(s.viewport.scroll_x, 148.0);
    }

    #[test]
    fn copy_then_paste_keeps_styles() {
        let (mut s, mut m) = state();
        let style = CellStyle {
            italic: true,
            ..CellStyle::default()
        };
        s.set_cell_style(1, 1, style, &mut m).unwrap();
        s.set_cell_value(1, 1, "a").unwrap();
        s.set_cell_value(1, 2, "b").unwrap();
        s.selection
            .select_range(&s.grid, CellPos::new(1, 1), CellPos::new(1, 2));
        let text = match press(&mut s, &mut m, KeyInput::new("c").ctrl()) {
            KeyResponse::WriteClipboard(text) => text,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(text, "a\tb");

        s.selection.select_cell(&s.grid, CellPos::new(5, 3));
        assert_eq!(press(&mut s, &mut m, KeyInput::new("v").ctrl()), KeyResponse::ReadClipboard);
        assert!(s.paste_text(&text, &mut m));
        assert_eq!(s.grid.value(CellPos::new(5, 4)), "b");
        assert!(s.grid.get(CellPos::new(5, 3)).unwrap().style.italic);
        assert_eq!(
            s.selection.selection().unwrap().absolute(),
            CellRange { r1: 5, r2: 5, c1: 3, c2: 4 }
        );
    }

    #[test]
    fn foreign_text_pastes_without_styles() {
        let (mut s, mut m) = state();
        s.selection.select_cell(&s.grid, CellPos::new(2, 2));
        assert!(s.paste_text("x\ty\nz", &mut m));
        assert_eq!(s.grid.value(CellPos::new(2, 3)), "y");
        assert_eq!(s.grid.value(CellPos::new(3, 2)), "z");
    }

    #[test]
    fn paste_goes_into_open_editor() {
        let (mut s, mut m) = state();
        s.open_editor(CellPos::new(1, 1), &mut m);
        assert!(s.paste_text("line1\r\nline2", &mut m));
        assert_eq!(s.editor.session().unwrap().value(), "line1\nline2");
        assert_eq!(s.grid.value(CellPos::new(1, 1)), "");
    }

    #[test]
    fn delete_clears_selection() {
        let (mut s, mut m) = state();
        s.set_cell_value(1, 1, "a").unwrap();
        s.set_cell_value(2, 1, "b").unwrap();
        s.selection
            .select_range(&s.grid, CellPos::new(1, 1), CellPos::new(2, 1));
        press(&mut s, &mut m, KeyInput::new("Delete"));
        assert_eq!(s.grid.value(CellPos::new(1, 1)), "");
        assert_eq!(s.grid.value(CellPos::new(2, 1)), "");
    }

    #[test]
    fn clicking_grid_commits_editor() {
        let (mut s, mut m) = state();
        s.open_editor(CellPos::new(1, 1), &mut m);
        s.set_editor_value("typed", &mut m);
        s.pointer_down(300.0, 100.0, false);
        assert_eq!(s.grid.value(CellPos::new(1, 1)), "typed");
        assert!(!s.editor.is_focused());
    }

    #[test]
    fn editor_pointer_places_caret() {
        let (mut s, mut m) = state();
        s.set_cell_value(1, 1, "abcdef").unwrap();
        s.open_editor(CellPos::new(1, 1), &mut m);
        // 4px padding + 2 chars
        s.editor_pointer_down(18.0, 12.0, false, &mut m);
        s.editor_pointer_move(4.0 + 35.0, 12.0, &mut m);
        s.editor_pointer_up();
        let session = s.editor.session().unwrap();
        assert_eq!(session.selected_text().as_deref(), Some("cde"));
    }

    #[test]
    fn editor_drag_reports_changes_and_ends_on_release() {
        let (mut s, mut m) = state();
        s.set_cell_value(1, 1, "abcdef").unwrap();
        s.open_editor(CellPos::new(1, 1), &mut m);
        s.editor_pointer_down(18.0, 12.0, false, &mut m);
        assert!(s.is_editor_dragging());
        assert!(s.editor_pointer_move(39.0, 12.0, &mut m));
        // same caret position: nothing to repaint
        s.render_editor(&mut RecordingSurface::new(MonospaceMeasure::new(7.0)), true);
        assert!(!s.editor_pointer_move(39.5, 12.0, &mut m));
        assert!(!s.needs_editor_render);

        s.editor_pointer_up();
        assert!(!s.is_editor_dragging());
        assert!(!s.editor_pointer_move(4.0, 12.0, &mut m));
        assert!(!s.needs_editor_render);
        let session = s.editor.session().unwrap();
        assert_eq!(session.selected_text().as_deref(), Some("cde"));
    }

    #[test]
    fn altgr_and_option_characters_start_editing() {
        let (mut s, mut m) = state();
        s.selection.select_cell(&s.grid, CellPos::new(2, 2));
        assert_eq!(press(&mut s, &mut m, KeyInput::new("@").ctrl().alt()), KeyResponse::Handled);
        assert_eq!(press(&mut s, &mut m, KeyInput::new("€").alt()), KeyResponse::Handled);
        press(&mut s, &mut m, KeyInput::new("Enter"));
        assert_eq!(s.grid.value(CellPos::new(2, 2)), "@€");
        // a plain Ctrl shortcut still does not type
        s.selection.select_cell(&s.grid, CellPos::new(4, 2));
        assert_eq!(press(&mut s, &mut m, KeyInput::new("q").ctrl()), KeyResponse::Ignored);
        assert!(!s.editor.is_focused());
    }

    #[test]
    fn overflow_map_reused_until_data_changes() {
        let (mut s, mut m) = state();
        let mut surface = RecordingSurface::new(MonospaceMeasure::new(7.0));
        s.render(&mut surface);
        s.render(&mut surface);
        assert_eq!(s.overflow_recomputes(), 1);
        s.set_cell_value(1, 1, "long text that spills").unwrap();
        s.render(&mut surface);
        assert_eq!(s.overflow_recomputes(), 2);
        s.scroll_by(0.0, 50.0, &mut m);
        s.render(&mut surface);
        assert_eq!(s.overflow_recomputes(), 3);
        assert!(!s.needs_render);
    }

    #[test]
    fn out_of_range_host_calls_error() {
        let (mut s, _) = state();
        assert!(matches!(
            s.set_cell_value(99, 1, "x"),
            Err(SheetError::OutOfRange { row: 99, col: 1 })
        ));
        assert!(s.cell_value(0, 99).is_err());
    }

    #[test]
    fn merge_through_state_expands_selection() {
        let (mut s, _) = state();
        s.selection.select_cell(&s.grid, CellPos::new(2, 3));
        s.merge_cells(CellRange { r1: 2, r2: 2, c1: 2, c2: 4 }).unwrap();
        assert_eq!(
            s.selection.selection().unwrap().absolute(),
            CellRange { r1: 2, r2: 2, c1: 2, c2: 4 }
        );
        assert!(s.merge_cells(CellRange { r1: 2, r2: 3, c1: 4, c2: 5 }).is_err());
    }
}
