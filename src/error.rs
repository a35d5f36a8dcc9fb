//! Structured error types for sheetgrid.
//!
//! Most grid operations degrade to "nothing happened" instead of failing;
//! these errors only surface at host-facing boundaries (config parsing,
//! merge/unmerge requests, explicit out-of-range calls, JS interop).

/// All errors that can surface from the grid core.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// A cell coordinate outside the grid.
    #[error("Cell ({row}, {col}) is out of range")]
    OutOfRange { row: u32, col: u32 },

    /// A merge request that cannot be honoured (degenerate, header, bounds).
    #[error("Invalid merge: {0}")]
    InvalidMerge(String),

    /// A merge request that would overlap an existing merge region.
    #[error("Merge overlaps existing region anchored at ({anchor_row}, {anchor_col})")]
    MergeOverlap { anchor_row: u32, anchor_col: u32 },

    /// Configuration could not be parsed.
    #[error("Config: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration parsed but holds unusable values.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// JS interop failure (DOM, canvas context, serde-wasm-bindgen).
    #[error("JS: {0}")]
    Js(String),

    /// Clipboard permission or format failure.
    #[error("Clipboard: {0}")]
    Clipboard(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetError>;

#[cfg(target_arch = "wasm32")]
impl From<SheetError> for wasm_bindgen::JsValue {
    fn from(e: SheetError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<serde_wasm_bindgen::Error> for SheetError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::Js(e.to_string())
    }
}
