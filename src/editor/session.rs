//! One editing session: the value being edited, cursor, text selection,
//! line layout and undo history for a single cell.
//!
//! Cursor and selection indices count chars. Geometry methods work in
//! editor-local pixels (origin at the editor's top-left corner).

use crate::config::GridConfig;
use crate::layout::CellRect;
use crate::render::colors::parse_color;
use crate::render::{anchor_x, first_line_center, line_left, CellFont, TextMeasure};
use crate::types::{CellPos, CellStyle, HAlign, TextDecoration};

use super::history::EditHistory;
use super::lines::{column_at_x, compute_lines, content_height, line_at_cursor, Line};

/// Text selection inside the editor. `anchor` stays put while `head`
/// follows the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub anchor: usize,
    pub head: usize,
}

impl TextRange {
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Layout and paint inputs captured from the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorFrame {
    /// Cell footprint in viewport pixels (merge-resolved).
    pub rect: CellRect,
    pub font: CellFont,
    /// Zoomed text padding.
    pub padding: f64,
    pub align: HAlign,
    pub wrap: bool,
    pub decoration: TextDecoration,
    pub color: String,
    pub background: String,
}

impl EditorFrame {
    pub fn new(rect: CellRect, style: &CellStyle, config: &GridConfig, zoom: f64) -> Self {
        Self {
            rect,
            font: CellFont::resolve(style, config, zoom),
            padding: config.cell_padding * zoom,
            align: style.align,
            wrap: style.wrap,
            decoration: style.decoration,
            color: style
                .color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or_else(|| config.font_color.clone()),
            background: style
                .background
                .as_deref()
                .and_then(parse_color)
                .unwrap_or_else(|| config.background.clone()),
        }
    }

    /// Width available to a wrapped line.
    pub fn max_line_width(&self) -> f64 {
        self.rect.width - 2.0 * self.padding
    }
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of char index `idx` (clamped to the end).
fn byte_offset(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// First `chars` characters of `s`.
fn prefix(s: &str, chars: usize) -> &str {
    s.get(..byte_offset(s, chars)).unwrap_or(s)
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn char_class(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    cell: CellPos,
    value: String,
    original: String,
    cursor: usize,
    selection: Option<TextRange>,
    lines: Vec<Line>,
    history: EditHistory,
    /// At a soft-wrap boundary, show the cursor at the end of the earlier
    /// line rather than the start of the later one.
    prefer_line_end: bool,
    frame: EditorFrame,
}

impl EditorSession {
    /// Open a session on `value` with the cursor at the end.
    pub fn new(
        cell: CellPos,
        value: &str,
        frame: EditorFrame,
        measure: &mut dyn TextMeasure,
    ) -> Self {
        let mut session = Self {
            cell,
            value: value.to_string(),
            original: value.to_string(),
            cursor: char_count(value),
            selection: None,
            lines: Vec::new(),
            history: EditHistory::new(),
            prefer_line_end: false,
            frame,
        };
        session.relayout(measure);
        session
    }

    pub fn cell(&self) -> CellPos {
        self.cell
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value when the session opened.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_modified(&self) -> bool {
        self.value != self.original
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn frame(&self) -> &EditorFrame {
        &self.frame
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn len(&self) -> usize {
        char_count(&self.value)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Recompute lines after the value or frame changed.
    pub fn relayout(&mut self, measure: &mut dyn TextMeasure) {
        self.lines = compute_lines(
            &self.value,
            self.frame.wrap,
            self.frame.max_line_width(),
            &self.frame.font.css,
            measure,
        );
    }

    /// Move the session to a new frame (scroll, zoom or resize happened).
    pub fn set_frame(&mut self, frame: EditorFrame, measure: &mut dyn TextMeasure) {
        if frame != self.frame {
            self.frame = frame;
            self.relayout(measure);
        }
    }

    fn selection_bounds(&self) -> Option<(usize, usize)> {
        self.selection
            .filter(|s| !s.is_empty())
            .map(|s| (s.start(), s.end()))
    }

    /// Replace chars `[start, end)` with `text` as one undoable edit.
    fn edit(&mut self, start: usize, end: usize, text: &str, measure: &mut dyn TextMeasure) {
        self.history.record(&self.value);
        let from = byte_offset(&self.value, start);
        let to = byte_offset(&self.value, end);
        self.value.replace_range(from..to, text);
        self.cursor = start + char_count(text);
        self.selection = None;
        self.prefer_line_end = false;
        self.relayout(measure);
    }

    /// Insert (or replace the selection with) `text`.
    pub fn insert_text(&mut self, text: &str, measure: &mut dyn TextMeasure) -> bool {
        let text = normalize_newlines(text);
        let (start, end) = self
            .selection_bounds()
            .unwrap_or((self.cursor, self.cursor));
        if text.is_empty() && start == end {
            return false;
        }
        self.edit(start, end, &text, measure);
        true
    }

    /// Delete the selection or the char before the cursor.
    pub fn backspace(&mut self, measure: &mut dyn TextMeasure) -> bool {
        if let Some((start, end)) = self.selection_bounds() {
            self.edit(start, end, "", measure);
            true
        } else if self.cursor > 0 {
            self.edit(self.cursor - 1, self.cursor, "", measure);
            true
        } else {
            false
        }
    }

    /// Delete the selection or the char after the cursor.
    pub fn delete_forward(&mut self, measure: &mut dyn TextMeasure) -> bool {
        if let Some((start, end)) = self.selection_bounds() {
            self.edit(start, end, "", measure);
            true
        } else if self.cursor < self.len() {
            self.edit(self.cursor, self.cursor + 1, "", measure);
            true
        } else {
            false
        }
    }

    fn move_to(&mut self, target: usize, extend: bool) {
        let target = target.min(self.len());
        self.selection = if extend {
            let anchor = self.selection.map_or(self.cursor, |s| s.anchor);
            (anchor != target).then_some(TextRange {
                anchor,
                head: target,
            })
        } else {
            None
        };
        self.cursor = target;
        self.prefer_line_end = false;
    }

    pub fn move_left(&mut self, extend: bool) {
        self.move_to(self.cursor.saturating_sub(1), extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        self.move_to(self.cursor + 1, extend);
    }

    /// Index of the visual line showing the cursor.
    pub fn current_line_index(&self) -> usize {
        line_at_cursor(&self.lines, self.cursor, self.prefer_line_end)
    }

    fn move_vertical(&mut self, down: bool, extend: bool) -> bool {
        let current = self.current_line_index();
        let Some(line) = self.lines.get(current) else {
            return false;
        };
        let column = self.cursor.saturating_sub(line.start_index);
        let target_index = if down {
            current + 1
        } else {
            match current.checked_sub(1) {
                Some(i) => i,
                None => return false,
            }
        };
        let Some(target) = self.lines.get(target_index) else {
            return false;
        };
        let new_cursor = target.start_index + column.min(target.len());
        let at_end = new_cursor == target.end_index && !target.is_empty();
        self.move_to(new_cursor, extend);
        self.prefer_line_end = at_end;
        true
    }

    pub fn move_up(&mut self, extend: bool) -> bool {
        self.move_vertical(false, extend)
    }

    pub fn move_down(&mut self, extend: bool) -> bool {
        self.move_vertical(true, extend)
    }

    /// Cursor to the start of its visual line.
    pub fn home(&mut self, extend: bool) {
        let start = self
            .lines
            .get(self.current_line_index())
            .map_or(0, |l| l.start_index);
        self.move_to(start, extend);
    }

    /// Cursor to the end of its visual line.
    pub fn end(&mut self, extend: bool) {
        let end = self
            .lines
            .get(self.current_line_index())
            .map_or(self.len(), |l| l.end_index);
        self.move_to(end, extend);
        self.prefer_line_end = true;
    }

    pub fn select_all(&mut self) {
        let len = self.len();
        self.selection = (len > 0).then_some(TextRange {
            anchor: 0,
            head: len,
        });
        self.cursor = len;
        self.prefer_line_end = false;
    }

    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection_bounds()?;
        let from = byte_offset(&self.value, start);
        let to = byte_offset(&self.value, end);
        self.value.get(from..to).map(str::to_string)
    }

    /// Remove the selection and return its text.
    pub fn cut_selection(&mut self, measure: &mut dyn TextMeasure) -> Option<String> {
        let text = self.selected_text()?;
        let (start, end) = self.selection_bounds()?;
        self.edit(start, end, "", measure);
        Some(text)
    }

    fn restore(&mut self, value: String, measure: &mut dyn TextMeasure) {
        self.value = value;
        self.cursor = self.len();
        self.selection = None;
        self.prefer_line_end = false;
        self.relayout(measure);
    }

    pub fn undo(&mut self, measure: &mut dyn TextMeasure) -> bool {
        match self.history.undo(&self.value) {
            Some(previous) => {
                self.restore(previous, measure);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, measure: &mut dyn TextMeasure) -> bool {
        match self.history.redo(&self.value) {
            Some(next) => {
                self.restore(next, measure);
                true
            }
            None => false,
        }
    }

    /// Replace the whole value (host-driven, e.g. a formula bar). Undoable.
    pub fn set_value(&mut self, text: &str, measure: &mut dyn TextMeasure) {
        let text = normalize_newlines(text);
        if text == self.value {
            return;
        }
        self.history.record(&self.value);
        self.restore(text, measure);
    }

    // ===== Geometry (editor-local pixels) =====

    /// Laid-out text height plus vertical padding.
    pub fn content_height(&self) -> f64 {
        content_height(self.lines.len(), self.frame.font.line_box) + 2.0 * self.frame.padding
    }

    /// Editor rectangle in viewport pixels: the cell footprint, grown
    /// downward when the text needs more room.
    pub fn editor_rect(&self) -> CellRect {
        CellRect {
            height: self.frame.rect.height.max(self.content_height()),
            ..self.frame.rect
        }
    }

    /// Editor rectangle at the local origin.
    pub fn local_rect(&self) -> CellRect {
        let rect = self.editor_rect();
        CellRect {
            x: 0.0,
            y: 0.0,
            ..rect
        }
    }

    /// Unzoomed row height the content needs.
    pub fn needed_row_height(&self, zoom: f64) -> f64 {
        if zoom > 0.0 {
            self.content_height() / zoom
        } else {
            0.0
        }
    }

    fn line_top(&self, index: usize) -> f64 {
        let line_box = self.frame.font.line_box;
        let first = first_line_center(&self.local_rect(), self.lines.len(), line_box);
        let offset = u32::try_from(index).unwrap_or(u32::MAX);
        first - line_box / 2.0 + f64::from(offset) * line_box
    }

    fn line_origin(&self, line: &Line, measure: &mut dyn TextMeasure) -> f64 {
        let anchor = anchor_x(&self.local_rect(), self.frame.padding, self.frame.align);
        let width = measure.measure(&self.frame.font.css, &line.content);
        line_left(anchor, self.frame.align, width)
    }

    /// X of a char offset inside `line`.
    fn x_in_line(&self, line: &Line, column: usize, measure: &mut dyn TextMeasure) -> f64 {
        let origin = self.line_origin(line, measure);
        origin + measure.measure(&self.frame.font.css, prefix(&line.content, column))
    }

    /// Caret as `(x, top, height)`.
    pub fn caret_geometry(&self, measure: &mut dyn TextMeasure) -> (f64, f64, f64) {
        let index = self.current_line_index();
        let line_box = self.frame.font.line_box;
        match self.lines.get(index) {
            Some(line) => {
                let column = self.cursor.saturating_sub(line.start_index);
                (
                    self.x_in_line(line, column, measure),
                    self.line_top(index),
                    line_box,
                )
            }
            None => (self.frame.padding, self.line_top(0), line_box),
        }
    }

    /// Highlight rectangles for the text selection, one per visual line.
    pub fn selection_rects(&self, measure: &mut dyn TextMeasure) -> Vec<CellRect> {
        let Some((start, end)) = self.selection_bounds() else {
            return Vec::new();
        };
        let mut rects = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            let from = start.max(line.start_index);
            let to = end.min(line.end_index);
            if from >= to {
                continue;
            }
            let left = self.x_in_line(line, from - line.start_index, measure);
            let right = self.x_in_line(line, to - line.start_index, measure);
            rects.push(CellRect {
                x: left,
                y: self.line_top(i),
                width: right - left,
                height: self.frame.font.line_box,
            });
        }
        rects
    }

    /// Cursor index under an editor-local point: the line bucket is found
    /// by stacking line boxes, the column by measuring prefixes.
    pub fn cursor_from_xy(&self, x: f64, y: f64, measure: &mut dyn TextMeasure) -> (usize, bool) {
        let line_box = self.frame.font.line_box;
        let mut index = 0;
        let mut bottom = self.line_top(0) + line_box;
        while index + 1 < self.lines.len() && y >= bottom {
            index += 1;
            bottom += line_box;
        }
        let Some(line) = self.lines.get(index) else {
            return (0, false);
        };
        let origin = self.line_origin(line, measure);
        let column = column_at_x(line, x - origin, &self.frame.font.css, measure);
        let at_end = column == line.len() && column > 0;
        (line.start_index + column, at_end)
    }

    /// Pointer down / drag inside the editor.
    pub fn place_cursor(&mut self, x: f64, y: f64, extend: bool, measure: &mut dyn TextMeasure) {
        let (cursor, at_end) = self.cursor_from_xy(x, y, measure);
        self.move_to(cursor, extend);
        self.prefer_line_end = at_end;
    }

    /// Double click: select the run of same-class chars under the point.
    pub fn select_word_at(&mut self, x: f64, y: f64, measure: &mut dyn TextMeasure) {
        let (cursor, _) = self.cursor_from_xy(x, y, measure);
        let chars: Vec<char> = self.value.chars().collect();
        // the char right of the cursor, or left of it at the end
        let target = if cursor < chars.len() {
            cursor
        } else {
            cursor.saturating_sub(1)
        };
        let Some(class) = chars.get(target).copied().map(char_class) else {
            return;
        };
        if chars.get(target) == Some(&'\n') {
            return;
        }
        let same = |i: usize| {
            chars
                .get(i)
                .is_some_and(|c| *c != '\n' && char_class(*c) == class)
        };
        let mut start = target;
        while start > 0 && same(start - 1) {
            start -= 1;
        }
        let mut end = target + 1;
        while same(end) {
            end += 1;
        }
        self.selection = Some(TextRange {
            anchor: start,
            head: end,
        });
        self.cursor = end;
        self.prefer_line_end = true;
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
    use crate::render::MonospaceMeasure;

    fn frame(width: f64, wrap: bool) -> EditorFrame {
        let style = CellStyle {
            wrap,
            ..CellStyle::default()
        };
        let rect = CellRect {
            x: 10.0,
            y: 20.0,
            width,
            height: 24.0,
        };
        EditorFrame::new(rect, &style, &GridConfig::default(), 1.0)
    }

    fn session(value: &str, width: f64, wrap: bool) -> (EditorSession, MonospaceMeasure) {
        let mut m = MonospaceMeasure::new(7.0);
        let s = EditorSession::new(CellPos::new(1, 1), value, frame(width, wrap), &mut m);
        (s, m)
    }

    #[test]
    fn opens_with_cursor_at_end() {
        let (s, _) = session("héllo", 100.0, false);
        assert_eq!(s.cursor(), 5);
        assert!(!s.is_modified());
    }

    #[test]
    fn typing_replaces_selection() {
        let (mut s, mut m) = session("hello", 100.0, false);
        s.select_all();
        assert!(s.insert_text("x", &mut m));
        assert_eq!(s.value(), "x");
        assert_eq!(s.cursor(), 1);
        assert!(s.selection().is_none());
    }

    #[test]
    fn backspace_and_delete_at_bounds() {
        let (mut s, mut m) = session("ab", 100.0, false);
        assert!(!s.delete_forward(&mut m));
        assert!(s.backspace(&mut m));
        assert_eq!(s.value(), "a");
        s.move_left(false);
        assert!(!s.backspace(&mut m));
        assert!(s.delete_forward(&mut m));
        assert_eq!(s.value(), "");
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn arrows_clear_selection_and_clamp() {
        let (mut s, _) = session("abc", 100.0, false);
        s.select_all();
        s.move_right(false);
        assert_eq!(s.cursor(), 3);
        assert!(s.selection().is_none());
        s.move_left(true);
        s.move_left(true);
        assert_eq!(s.selected_text().as_deref(), Some("bc"));
        for _ in 0..10 {
            s.move_left(false);
        }
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn vertical_moves_keep_column() {
        // 10 chars per line (70px interior in a 78px cell)
        let (mut s, _) = session("abcdefghijklmnopqrstuvw", 78.0, true);
        assert_eq!(s.lines().len(), 3);
        assert!(s.move_up(false));
        assert_eq!(s.cursor(), 13);
        assert!(s.move_up(false));
        assert_eq!(s.cursor(), 3);
        assert!(!s.move_up(false));
        s.end(false);
        assert_eq!(s.cursor(), 10);
        assert_eq!(s.current_line_index(), 0);
        assert!(s.move_down(false));
        assert_eq!(s.cursor(), 20);
        assert_eq!(s.current_line_index(), 1);
        s.home(false);
        assert_eq!(s.cursor(), 10);
        assert_eq!(s.current_line_index(), 1);
    }

    #[test]
    fn vertical_move_clamps_to_shorter_line() {
        let (mut s, _) = session("abcdef\nab", 200.0, false);
        s.move_up(false);
        assert_eq!(s.cursor(), 2);
        s.end(false);
        assert!(s.move_down(false));
        assert_eq!(s.cursor(), 9);
    }

    #[test]
    fn undo_redo_restore_values() {
        let (mut s, mut m) = session("a", 100.0, false);
        s.insert_text("b", &mut m);
        assert!(s.undo(&mut m));
        assert_eq!(s.value(), "a");
        assert!(s.redo(&mut m));
        assert_eq!(s.value(), "ab");
        assert!(!s.redo(&mut m));
    }

    #[test]
    fn cut_removes_selection() {
        let (mut s, mut m) = session("hello world", 200.0, false);
        s.home(false);
        for _ in 0..5 {
            s.move_right(true);
        }
        assert_eq!(s.cut_selection(&mut m).as_deref(), Some("hello"));
        assert_eq!(s.value(), " world");
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn pasted_crlf_becomes_newlines() {
        let (mut s, mut m) = session("", 200.0, false);
        s.insert_text("a\r\nb", &mut m);
        assert_eq!(s.value(), "a\nb");
        assert_eq!(s.lines().len(), 2);
    }

    #[test]
    fn hit_testing_finds_line_and_column() {
        let (mut s, mut m) = session("abcdefghijklmnopqrst", 78.0, true);
        assert_eq!(s.lines().len(), 2);
        let top = s.line_top(0);
        // second line, between 'm' and 'n' (3 chars in = 21px + 4px padding)
        let (cursor, _) = s.cursor_from_xy(4.0 + 21.0, top + 15.0, &mut m);
        assert_eq!(cursor, 13);
        s.place_cursor(500.0, top + 1.0, false, &mut m);
        assert_eq!(s.cursor(), 10);
        assert_eq!(s.current_line_index(), 0);
        s.place_cursor(-5.0, 500.0, true, &mut m);
        assert_eq!(s.cursor(), 10);
        assert_eq!(s.current_line_index(), 1);
    }

    #[test]
    fn word_selection_on_double_click() {
        let (mut s, mut m) = session("foo bar_baz!", 200.0, false);
        // x inside "bar_baz": padding 4 + 6 chars
        s.select_word_at(4.0 + 42.0 + 1.0, 12.0, &mut m);
        assert_eq!(s.selected_text().as_deref(), Some("bar_baz"));
    }

    #[test]
    fn editor_grows_with_content() {
        let (mut s, mut m) = session("", 78.0, true);
        assert_eq!(s.editor_rect().height, 24.0);
        s.insert_text(&"x".repeat(30), &mut m);
        // 3 lines * 13.2 + 8 padding
        assert!((s.editor_rect().height - 47.6).abs() < 1e-9);
        assert!((s.needed_row_height(1.0) - 47.6).abs() < 1e-9);
        assert_eq!(s.editor_rect().x, 10.0);
    }

    #[test]
    fn selection_rects_cover_each_line() {
        let (mut s, mut m) = session("abcdefghijklmno", 78.0, true);
        s.select_all();
        let rects = s.selection_rects(&mut m);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].width, 70.0);
        assert_eq!(rects[1].width, 35.0);
    }
}
