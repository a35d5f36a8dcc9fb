//! sheetgrid - spreadsheet grid widget for the web
//!
//! Renders and edits a cell grid in the browser via WebAssembly and Canvas 2D:
//! - Virtualized drawing of only the visible rows and columns
//! - Frozen header row and column with letter / number labels
//! - Merged cells with merge-aware selection
//! - Text overflow into empty neighbours with border suppression
//! - In-place multi-line cell editor with wrap, undo/redo and clipboard
//!
//! Everything except the DOM wiring runs natively too: [`GridState`]
//! drives the same interaction model headlessly against any
//! [`render::Surface`].
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { SheetGrid } from 'sheetgrid';
//! await init();
//! const grid = new SheetGrid(container, 101, 27, { fontSize: 12 });
//! grid.setCellValue(1, 1, 'Hello World');
//! grid.setOnCellDoubleClick((row, col) => grid.focus(row, col));
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod layout;
pub mod merge;
pub mod render;
pub mod selection;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use error::{Result, SheetError};
pub use types::*;
pub use viewer::{FrameRequest, GridState, KeyResponse};
#[cfg(target_arch = "wasm32")]
pub use viewer::SheetGrid;

/// Module initialisation: panic messages and `log` output go to the
/// browser console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"sheetgrid: logger already installed".into());
    }
}

/// Default grid configuration as a JS object.
///
/// # Errors
/// Returns an error if the configuration cannot be converted.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = "defaultConfig")]
pub fn default_config() -> std::result::Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&GridConfig::default()).map_err(SheetError::from)?)
}

/// Check a configuration object, returning its normalized form.
///
/// # Errors
/// Returns an error when a field has the wrong type or an unusable value.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = "validateConfig")]
pub fn validate_config(config: JsValue) -> std::result::Result<JsValue, JsValue> {
    let config: GridConfig = serde_wasm_bindgen::from_value(config).map_err(SheetError::from)?;
    config.validate()?;
    Ok(serde_wasm_bindgen::to_value(&config).map_err(SheetError::from)?)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
