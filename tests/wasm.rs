//! Browser bindings smoke tests.
//!
//! Run with: wasm-pack test --headless --chrome

#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

use sheetgrid::{default_config, validate_config, SheetGrid};

wasm_bindgen_test_configure!(run_in_browser);

fn container() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let div: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    div.style().set_property("width", "640px").unwrap();
    div.style().set_property("height", "320px").unwrap();
    document.body().unwrap().append_child(&div).unwrap();
    div
}

// =============================================================================
// Config
// =============================================================================

#[wasm_bindgen_test]
fn default_config_validates() {
    let config = default_config().unwrap();
    assert!(validate_config(config).is_ok());
}

#[wasm_bindgen_test]
fn negative_font_size_is_rejected() {
    let config = default_config().unwrap();
    js_sys::Reflect::set(&config, &"fontSize".into(), &JsValue::from_f64(-1.0)).unwrap();
    assert!(validate_config(config).is_err());
}

// =============================================================================
// Widget
// =============================================================================

#[wasm_bindgen_test]
fn widget_edits_and_reports_cells() {
    let host = container();
    let grid = SheetGrid::new(host.clone(), 20, 8, JsValue::UNDEFINED).unwrap();
    assert_eq!(host.child_element_count(), 2);

    grid.set_cell_value(2, 3, "hello").unwrap();
    assert_eq!(grid.cell_value(2, 3).unwrap(), "hello");
    assert!(grid.cell_value(99, 3).is_err());

    assert!(grid.focus(2, 3));
    assert_eq!(grid.editing_cell(), Some(vec![2, 3]));
    assert!(grid.set_value("world"));
    assert!(grid.blur());
    assert_eq!(grid.cell_value(2, 3).unwrap(), "world");
    assert_eq!(grid.editing_cell(), None);

    grid.merge_cells(4, 1, 5, 2).unwrap();
    assert_eq!(grid.unmerge_cells(5, 2).unwrap(), vec![4, 1, 5, 2]);

    grid.render();
    drop(grid);
    assert_eq!(host.child_element_count(), 0);
    host.remove();
}

#[wasm_bindgen_test]
fn header_cells_refuse_focus() {
    let host = container();
    let grid = SheetGrid::new(host.clone(), 10, 4, JsValue::UNDEFINED).unwrap();
    assert!(!grid.focus(0, 1));
    assert!(!grid.focus(1, 0));
    assert_eq!(grid.editing_cell(), None);
    drop(grid);
    host.remove();
}
