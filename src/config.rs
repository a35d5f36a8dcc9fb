//! Style and size defaults for the grid.
//!
//! Hosts pass a (partial) config object at construction; every field has a
//! default so `{}` is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};

/// Grid-wide defaults consumed by the renderer, the overflow pass and the
/// text editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Font family used when a cell style does not name one
    pub font_family: String,
    /// Font size in unzoomed pixels (~11px like common spreadsheet UIs)
    pub font_size: f64,
    /// Default text colour
    pub font_color: String,
    /// Default cell background
    pub background: String,
    /// Horizontal text padding inside a cell (each side), unzoomed
    pub cell_padding: f64,
    /// Line height as a multiple of the font size
    pub line_height: f64,
    /// Default width of data columns
    pub default_col_width: f64,
    /// Default height of data rows
    pub default_row_height: f64,
    /// Width of the frozen header column (column 0)
    pub header_col_width: f64,
    /// Height of the frozen header row (row 0)
    pub header_row_height: f64,
    /// Grid line colour
    pub grid_line_color: String,
    /// Header background
    pub header_background: String,
    /// Header label colour
    pub header_text_color: String,
    /// Header background when its row/column is covered by the selection
    pub header_selected_background: String,
    /// Separator between frozen headers and the scrollable area
    pub frozen_separator_color: String,
    /// Selection rectangle outline
    pub selection_color: String,
    /// Selection rectangle fill
    pub selection_fill: String,
    /// Border drawn around the open text editor
    pub editor_border_color: String,
    /// Caret colour
    pub caret_color: String,
    /// Highlight behind selected text in the editor
    pub text_selection_color: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 11.0,
            font_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            cell_padding: 4.0,
            line_height: 1.2,
            default_col_width: 100.0,
            default_row_height: 24.0,
            header_col_width: 48.0,
            header_row_height: 24.0,
            grid_line_color: "#E2E2E2".to_string(),
            header_background: "#F3F3F3".to_string(),
            header_text_color: "#595959".to_string(),
            header_selected_background: "#CFD8E8".to_string(),
            frozen_separator_color: "#BABABA".to_string(),
            selection_color: "#0078D7".to_string(),
            selection_fill: "rgba(0, 120, 215, 0.1)".to_string(),
            editor_border_color: "#0078D7".to_string(),
            caret_color: "#000000".to_string(),
            text_selection_color: "rgba(0, 120, 215, 0.3)".to_string(),
        }
    }
}

impl GridConfig {
    /// Parse a config from JSON text. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject sizes that would break layout math.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("fontSize", self.font_size),
            ("lineHeight", self.line_height),
            ("defaultColWidth", self.default_col_width),
            ("defaultRowHeight", self.default_row_height),
            ("headerColWidth", self.header_col_width),
            ("headerRowHeight", self.header_row_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SheetError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.cell_padding.is_finite() && self.cell_padding >= 0.0) {
            return Err(SheetError::InvalidConfig(format!(
                "cellPadding must be non-negative, got {}",
                self.cell_padding
            )));
        }
        Ok(())
    }

    /// Line box height at the given font size (already zoomed).
    pub fn line_box(&self, font_size_px: f64) -> f64 {
        font_size_px * self.line_height
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

    #[test]
    fn empty_json_gives_defaults() {
        let config = GridConfig::from_json("{}").unwrap();
        assert_eq!(config, GridConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            GridConfig::from_json(r##"{"fontSize": 14, "gridLineColor": "#000"}"##).unwrap();
        assert_eq!(config.font_size, 14.0);
        assert_eq!(config.grid_line_color, "#000");
        assert_eq!(config.cell_padding, 4.0);
    }

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(matches!(
            GridConfig::from_json(r#"{"defaultColWidth": 0}"#),
            Err(SheetError::InvalidConfig(_))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{"cellPadding": -1}"#),
            Err(SheetError::InvalidConfig(_))
        ));
        assert!(matches!(
            GridConfig::from_json("not json"),
            Err(SheetError::Config(_))
        ));
    }
}
