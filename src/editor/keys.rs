//! Keyboard dispatch for the cell text editor.

use crate::render::TextMeasure;

use super::session::EditorSession;

/// The parts of a keyboard event the editor looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    /// DOM `KeyboardEvent.key` value ("a", "Enter", "ArrowLeft", ...)
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS. Ctrl+Alt is AltGr on
    /// Windows and Linux layouts and does not count.
    pub fn command(&self) -> bool {
        self.meta || (self.ctrl && !self.alt)
    }

    fn printable(&self) -> Option<char> {
        let mut chars = self.key.chars();
        let c = chars.next()?;
        (chars.next().is_none() && !c.is_control()).then_some(c)
    }

    /// The character this key types into a cell: unmodified, composed
    /// with Option on macOS, or with AltGr (Ctrl+Alt).
    pub fn text_char(&self) -> Option<char> {
        if self.command() {
            return None;
        }
        self.printable()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_event(event: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: event.key(),
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
        }
    }
}

/// Where focus goes after a committing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMove {
    Down,
    Up,
    Right,
    Left,
}

/// What the host has to do after the editor saw a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Editor state changed; redraw.
    Handled,
    /// Not an editor key; let the event through.
    Ignored,
    /// Reserved command key; prevent default and do nothing.
    Swallowed,
    /// Write this text to the clipboard.
    Copy(String),
    /// Write this text to the clipboard (already removed from the value).
    Cut(String),
    /// Read the clipboard and call `insert_text` with the result.
    Paste,
    /// Commit the value and move the focused cell.
    Commit(CommitMove),
    /// Restore the pre-edit value and close the editor.
    Cancel,
}

/// Apply one key to the session.
pub fn handle_key(
    session: &mut EditorSession,
    input: &KeyInput,
    measure: &mut dyn TextMeasure,
) -> KeyOutcome {
    if input.command() {
        return handle_command(session, input, measure);
    }
    let extend = input.shift;
    match input.key.as_str() {
        "Enter" if input.alt => {
            session.insert_text("\n", measure);
            KeyOutcome::Handled
        }
        "Enter" => KeyOutcome::Commit(if input.shift {
            CommitMove::Up
        } else {
            CommitMove::Down
        }),
        "Tab" => KeyOutcome::Commit(if input.shift {
            CommitMove::Left
        } else {
            CommitMove::Right
        }),
        "Escape" => KeyOutcome::Cancel,
        "Backspace" => {
            session.backspace(measure);
            KeyOutcome::Handled
        }
        "Delete" => {
            session.delete_forward(measure);
            KeyOutcome::Handled
        }
        "ArrowLeft" => {
            session.move_left(extend);
            KeyOutcome::Handled
        }
        "ArrowRight" => {
            session.move_right(extend);
            KeyOutcome::Handled
        }
        "ArrowUp" => {
            session.move_up(extend);
            KeyOutcome::Handled
        }
        "ArrowDown" => {
            session.move_down(extend);
            KeyOutcome::Handled
        }
        "Home" => {
            session.home(extend);
            KeyOutcome::Handled
        }
        "End" => {
            session.end(extend);
            KeyOutcome::Handled
        }
        _ => match input.text_char() {
            Some(c) => {
                let mut buf = [0u8; 4];
                session.insert_text(c.encode_utf8(&mut buf), measure);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        },
    }
}

fn handle_command(
    session: &mut EditorSession,
    input: &KeyInput,
    measure: &mut dyn TextMeasure,
) -> KeyOutcome {
    match input.key.to_ascii_lowercase().as_str() {
        "a" => {
            session.select_all();
            KeyOutcome::Handled
        }
        "z" if input.shift => {
            session.redo(measure);
            KeyOutcome::Handled
        }
        "z" => {
            session.undo(measure);
            KeyOutcome::Handled
        }
        "y" => {
            session.redo(measure);
            KeyOutcome::Handled
        }
        // no selection: copy the whole value
        "c" => KeyOutcome::Copy(
            session
                .selected_text()
                .unwrap_or_else(|| session.value().to_string()),
        ),
        "x" => match session.cut_selection(measure) {
            Some(text) => KeyOutcome::Cut(text),
            None => KeyOutcome::Swallowed,
        },
        "v" => KeyOutcome::Paste,
        _ => KeyOutcome::Swallowed,
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
    use crate::config::GridConfig;
    use crate::editor::EditorFrame;
    use crate::layout::CellRect;
    use crate::render::MonospaceMeasure;
    use crate::types::{CellPos, CellStyle};
    use test_case::test_case;

    fn session(value: &str) -> (EditorSession, MonospaceMeasure) {
        let mut m = MonospaceMeasure::new(7.0);
        let rect = CellRect {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 24.0,
        };
        let frame = EditorFrame::new(rect, &CellStyle::default(), &GridConfig::default(), 1.0);
        let s = EditorSession::new(CellPos::new(1, 1), value, frame, &mut m);
        (s, m)
    }

    #[test]
    fn typing_inserts_characters() {
        let (mut s, mut m) = session("");
        for key in ["h", "i", "!"] {
            assert_eq!(handle_key(&mut s, &KeyInput::new(key), &mut m), KeyOutcome::Handled);
        }
        assert_eq!(s.value(), "hi!");
    }

    #[test]
    fn alt_enter_inserts_newline() {
        let (mut s, mut m) = session("ab");
        handle_key(&mut s, &KeyInput::new("ArrowLeft"), &mut m);
        handle_key(&mut s, &KeyInput::new("Enter").alt(), &mut m);
        assert_eq!(s.value(), "a\nb");
        assert_eq!(s.lines().len(), 2);
    }

    #[test]
    fn enter_and_tab_commit() {
        let (mut s, mut m) = session("x");
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("Enter"), &mut m),
            KeyOutcome::Commit(CommitMove::Down)
        );
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("Tab").shift(), &mut m),
            KeyOutcome::Commit(CommitMove::Left)
        );
        assert_eq!(handle_key(&mut s, &KeyInput::new("Escape"), &mut m), KeyOutcome::Cancel);
    }

    #[test]
    fn command_keys() {
        let (mut s, mut m) = session("abc");
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("c").ctrl(), &mut m),
            KeyOutcome::Copy("abc".into())
        );
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("x").ctrl(), &mut m),
            KeyOutcome::Swallowed
        );
        handle_key(&mut s, &KeyInput::new("a").ctrl(), &mut m);
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("x").ctrl(), &mut m),
            KeyOutcome::Cut("abc".into())
        );
        assert_eq!(s.value(), "");
        handle_key(&mut s, &KeyInput::new("z").ctrl(), &mut m);
        assert_eq!(s.value(), "abc");
        handle_key(&mut s, &KeyInput::new("y").ctrl(), &mut m);
        assert_eq!(s.value(), "");
        assert_eq!(handle_key(&mut s, &KeyInput::new("v").ctrl(), &mut m), KeyOutcome::Paste);
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("b").ctrl(), &mut m),
            KeyOutcome::Swallowed
        );
    }

    #[test]
    fn shift_arrows_extend_text_selection() {
        let (mut s, mut m) = session("hello");
        handle_key(&mut s, &KeyInput::new("ArrowLeft").shift(), &mut m);
        handle_key(&mut s, &KeyInput::new("ArrowLeft").shift(), &mut m);
        assert_eq!(s.selected_text().as_deref(), Some("lo"));
        handle_key(&mut s, &KeyInput::new("Home").shift(), &mut m);
        assert_eq!(s.selected_text().as_deref(), Some("hello"));
    }

    #[test]
    fn option_and_altgr_characters_are_typed() {
        let (mut s, mut m) = session("a");
        assert_eq!(handle_key(&mut s, &KeyInput::new("å").alt(), &mut m), KeyOutcome::Handled);
        assert_eq!(
            handle_key(&mut s, &KeyInput::new("@").ctrl().alt(), &mut m),
            KeyOutcome::Handled
        );
        assert_eq!(s.value(), "aå@");
    }

    #[test_case("x", false, false, false, Some('x'); "plain")]
    #[test_case("é", false, false, false, Some('é'); "plain non ascii")]
    #[test_case("€", false, true, false, Some('€'); "option composed")]
    #[test_case("{", true, true, false, Some('{'); "altgr")]
    #[test_case("c", true, false, false, None; "ctrl shortcut")]
    #[test_case("c", false, false, true, None; "cmd shortcut")]
    #[test_case("c", false, true, true, None; "cmd option")]
    #[test_case("Enter", false, true, false, None; "alt enter is not text")]
    #[test_case("ArrowLeft", false, false, false, None; "named key")]
    fn text_char_by_modifiers(key: &str, ctrl: bool, alt: bool, meta: bool, expected: Option<char>) {
        let input = KeyInput {
            key: key.to_string(),
            ctrl,
            alt,
            meta,
            shift: false,
        };
        assert_eq!(input.text_char(), expected);
        // commands and typed text are mutually exclusive
        assert!(!(input.command() && input.text_char().is_some()));
    }

    #[test]
    fn non_printable_keys_are_ignored() {
        let (mut s, mut m) = session("a");
        assert_eq!(handle_key(&mut s, &KeyInput::new("F5"), &mut m), KeyOutcome::Ignored);
        assert_eq!(handle_key(&mut s, &KeyInput::new("Shift"), &mut m), KeyOutcome::Ignored);
        assert_eq!(s.value(), "a");
    }
}
