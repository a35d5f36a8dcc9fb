//! Cell text editor: layout, editing operations and the focus lifecycle.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{measure, GridBuilder, CHAR_WIDTH};
use sheetgrid::editor::{compute_lines, join_lines, KeyInput};
use sheetgrid::{CellPos, GridState, KeyResponse};
use test_case::test_case;

const FONT: &str = "11px sans-serif";

fn type_text(state: &mut GridState, text: &str) {
    let mut m = measure();
    for c in text.chars() {
        let key = if c == '\n' {
            KeyInput::new("Enter").alt()
        } else {
            KeyInput::new(&c.to_string())
        };
        assert_eq!(state.key_down(&key, &mut m), KeyResponse::Handled, "key {c:?}");
    }
}

fn press(state: &mut GridState, key: KeyInput) -> KeyResponse {
    state.key_down(&key, &mut measure())
}

// ============================================================================
// Line layout
// ============================================================================

#[test]
fn fifty_chars_wrap_into_five_lines() {
    let value = "abcdefghij".repeat(5);
    // room for exactly ten 7px characters
    let lines = compute_lines(&value, true, 10.0 * CHAR_WIDTH, FONT, &mut measure());
    assert_eq!(lines.len(), 5);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line.start_index, i * 10);
        assert_eq!(line.end_index, i * 10 + 10);
        assert_eq!(line.content, "abcdefghij");
        assert_eq!(line.hard_line_index, 0);
    }
}

#[test_case(""; "empty")]
#[test_case("one line"; "single")]
#[test_case("first\nsecond\n\nfourth"; "hard lines with blank")]
#[test_case("a very long line that has to wrap several times\nand more"; "soft and hard")]
#[test_case("trailing newline\n"; "trailing newline")]
#[test_case("ünïcödé wräps cörrectly tóó"; "multibyte")]
fn layout_round_trips(value: &str) {
    for wrap in [false, true] {
        let lines = compute_lines(value, wrap, 50.0, FONT, &mut measure());
        assert_eq!(join_lines(&lines), value, "wrap = {wrap}");
        let last = lines.last().unwrap();
        assert_eq!(last.end_index, value.chars().count());
    }
}

#[test]
fn unbreakable_char_still_progresses() {
    // narrower than one character: every char gets its own line
    let lines = compute_lines("wxyz", true, 3.0, FONT, &mut measure());
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3].content, "z");
}

// ============================================================================
// Editing through GridState
// ============================================================================

#[test]
fn typing_fifty_chars_grows_row_on_commit() {
    // interior 78 - 2 * 4 = 70px = ten characters
    let mut state = GridBuilder::new(10, 5)
        .wrapped(1, 1)
        .col_width(1, 78.0)
        .state(800.0, 400.0);
    state.selection.select_cell(&state.grid, CellPos::new(1, 1));
    type_text(&mut state, &"abcdefghij".repeat(5));

    let session = state.editor.session().unwrap();
    assert_eq!(session.lines().len(), 5);
    assert_eq!(session.cursor(), 50);
    // editor grows downward past the 24px cell
    assert!(session.editor_rect().height > 24.0);

    press(&mut state, KeyInput::new("Enter"));
    assert_eq!(state.grid.value(CellPos::new(1, 1)).len(), 50);
    // 5 lines * 13.2 + 2 * 4 padding
    assert!((state.sizes.row_height(1) - 74.0).abs() < 1e-9);
}

#[test]
fn row_never_shrinks_on_shorter_value() {
    let mut state = GridBuilder::new(10, 5)
        .wrapped(1, 1)
        .row_height(1, 120.0)
        .state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    type_text(&mut state, "x");
    state.commit_edit();
    assert_eq!(state.sizes.row_height(1), 120.0);
}

#[test]
fn merged_cell_does_not_grow_its_row() {
    let mut state = GridBuilder::new(10, 5)
        .wrapped(2, 2)
        .merge(2, 2, 2, 3)
        .state(800.0, 400.0);
    state.open_editor(CellPos::new(2, 3), &mut measure());
    assert_eq!(state.editor.editing_cell(), Some(CellPos::new(2, 2)));
    type_text(&mut state, &"m".repeat(80));
    state.commit_edit();
    assert_eq!(state.sizes.row_height(2), 24.0);
    assert_eq!(state.grid.value(CellPos::new(2, 2)).len(), 80);
}

#[test]
fn escape_restores_value_without_growing() {
    let mut state = GridBuilder::new(10, 5)
        .wrapped(1, 1)
        .value(1, 1, "before")
        .state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    type_text(&mut state, &" after".repeat(20));
    press(&mut state, KeyInput::new("Escape"));
    assert_eq!(state.grid.value(CellPos::new(1, 1)), "before");
    assert_eq!(state.sizes.row_height(1), 24.0);
    assert!(!state.editor.is_focused());
}

#[test]
fn header_and_read_only_cells_refuse_focus() {
    let mut state = GridBuilder::new(10, 5).state(800.0, 400.0);
    state.grid.update_cell(CellPos::new(3, 3), |c| c.read_only = true);
    assert!(!state.open_editor(CellPos::new(0, 2), &mut measure()));
    assert!(!state.open_editor(CellPos::new(3, 3), &mut measure()));
    assert!(!state.open_editor(CellPos::new(50, 1), &mut measure()));
    assert!(state.open_editor(CellPos::new(3, 2), &mut measure()));
}

#[test]
fn undo_and_redo_single_edit() {
    let mut state = GridBuilder::new(10, 5).value(1, 1, "ab").state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    type_text(&mut state, "c");
    press(&mut state, KeyInput::new("z").ctrl());
    assert_eq!(state.editor.session().unwrap().value(), "ab");
    press(&mut state, KeyInput::new("y").ctrl());
    assert_eq!(state.editor.session().unwrap().value(), "abc");
}

#[test]
fn cursor_stays_in_bounds_through_key_sequence() {
    let mut state = GridBuilder::new(10, 5)
        .wrapped(1, 1)
        .value(1, 1, "hello\nwide world of text")
        .state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    let keys = [
        KeyInput::new("ArrowUp"),
        KeyInput::new("ArrowUp"),
        KeyInput::new("Home"),
        KeyInput::new("ArrowLeft"),
        KeyInput::new("Backspace"),
        KeyInput::new("End").shift(),
        KeyInput::new("Delete"),
        KeyInput::new("ArrowDown"),
        KeyInput::new("ArrowDown"),
        KeyInput::new("ArrowDown"),
        KeyInput::new("End"),
        KeyInput::new("ArrowRight"),
        KeyInput::new("Delete"),
        KeyInput::new("a").ctrl(),
        KeyInput::new("Backspace"),
        KeyInput::new("Backspace"),
        KeyInput::new("z").ctrl(),
        KeyInput::new("ArrowLeft").shift(),
    ];
    for key in keys {
        press(&mut state, key);
        let session = state.editor.session().unwrap();
        assert!(session.cursor() <= session.len());
        assert_eq!(join_lines(session.lines()), session.value());
    }
}

#[test]
fn alt_enter_inserts_hard_line() {
    let mut state = GridBuilder::new(10, 5).state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    type_text(&mut state, "top\nbottom");
    let session = state.editor.session().unwrap();
    assert_eq!(session.value(), "top\nbottom");
    assert_eq!(session.lines().len(), 2);
    assert_eq!(session.lines()[1].hard_line_index, 1);
}

#[test]
fn editor_copy_and_paste_are_plain_text() {
    let mut state = GridBuilder::new(10, 5).value(1, 1, "copy me").state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    press(&mut state, KeyInput::new("a").ctrl());
    assert_eq!(
        press(&mut state, KeyInput::new("x").ctrl()),
        KeyResponse::WriteClipboard("copy me".into())
    );
    assert_eq!(state.editor.session().unwrap().value(), "");
    assert_eq!(press(&mut state, KeyInput::new("v").ctrl()), KeyResponse::ReadClipboard);
    assert!(state.paste_text("pasted\ttext", &mut measure()));
    assert_eq!(state.editor.session().unwrap().value(), "pasted\ttext");
    // unassigned shortcuts are swallowed
    assert_eq!(press(&mut state, KeyInput::new("b").ctrl()), KeyResponse::Handled);
    assert_eq!(state.editor.session().unwrap().value(), "pasted\ttext");
}

// ============================================================================
// Modifier handling
// ============================================================================

#[test_case("å", false, true, false, Some("å"); "option composed")]
#[test_case("@", true, true, false, Some("@"); "altgr")]
#[test_case("é", false, false, false, Some("é"); "plain non ascii")]
#[test_case("s", true, false, false, None; "ctrl shortcut")]
#[test_case("s", false, false, true, None; "cmd shortcut")]
#[test_case("ø", false, true, true, None; "cmd option")]
fn typed_character_by_modifiers(key: &str, ctrl: bool, alt: bool, meta: bool, typed: Option<&str>) {
    let mut input = KeyInput::new(key);
    input.ctrl = ctrl;
    input.alt = alt;
    input.meta = meta;

    // type-to-edit on the focused cell
    let mut state = GridBuilder::new(10, 5).value(2, 2, "kept").state(800.0, 400.0);
    state.selection.select_cell(&state.grid, CellPos::new(2, 2));
    press(&mut state, input.clone());
    match typed {
        Some(text) => {
            assert_eq!(state.editor.session().unwrap().value(), text);
            press(&mut state, KeyInput::new("Enter"));
            assert_eq!(state.grid.value(CellPos::new(2, 2)), text);
        }
        None => {
            assert!(!state.editor.is_focused());
            assert_eq!(state.grid.value(CellPos::new(2, 2)), "kept");
        }
    }

    // inside an open editor
    let mut state = GridBuilder::new(10, 5).value(1, 1, "x").state(800.0, 400.0);
    state.open_editor(CellPos::new(1, 1), &mut measure());
    press(&mut state, KeyInput::new("End"));
    press(&mut state, input);
    let expected = format!("x{}", typed.unwrap_or_default());
    assert_eq!(state.editor.session().unwrap().value(), expected);
}

#[test]
fn caret_drag_lifecycle() {
    // 4px padding, 7px characters
    let mut state = GridBuilder::new(10, 5).value(1, 1, "abcdefgh").state(800.0, 400.0);
    let mut m = measure();
    state.open_editor(CellPos::new(1, 1), &mut m);

    state.editor_pointer_down(4.0 + 7.0, 12.0, false, &mut m);
    assert!(state.is_editor_dragging());
    assert!(state.editor_pointer_move(4.0 + 28.0, 12.0, &mut m));
    assert_eq!(state.editor.session().unwrap().selected_text().as_deref(), Some("bcd"));
    state.editor_pointer_up();

    // moving after release leaves the selection alone
    assert!(!state.is_editor_dragging());
    assert!(!state.editor_pointer_move(4.0 + 49.0, 12.0, &mut m));
    assert_eq!(state.editor.session().unwrap().selected_text().as_deref(), Some("bcd"));

    // a shift press extends from the existing anchor
    state.editor_pointer_down(4.0 + 42.0, 12.0, true, &mut m);
    state.editor_pointer_up();
    assert_eq!(state.editor.session().unwrap().selected_text().as_deref(), Some("bcdef"));
}
