use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Per-cell style. Unset fields fall back to `GridConfig` defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    // Font
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub decoration: TextDecoration,

    // Fill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    // Grid border colour override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,

    // Alignment
    pub align: HAlign,
    pub wrap: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

impl HAlign {
    /// Canvas `textAlign` keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl CellStyle {
    /// Font size in unzoomed pixels.
    pub fn font_size_or(&self, default_size: f64) -> f64 {
        self.font_size.filter(|s| *s > 0.0).unwrap_or(default_size)
    }

    /// Build a CSS font shorthand at the given (already zoomed) size.
    pub fn css_font(&self, size_px: f64, default_family: &str) -> String {
        let mut font = String::with_capacity(48);
        if self.italic {
            font.push_str("italic ");
        }
        if self.bold {
            font.push_str("bold ");
        }
        let _ = write!(
            font,
            "{}px {}",
            size_px,
            self.font_family.as_deref().unwrap_or(default_family)
        );
        font
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
    fn css_font_includes_weight_and_slant() {
        let style = CellStyle {
            bold: true,
            italic: true,
            font_family: Some("Inter".into()),
            ..CellStyle::default()
        };
        assert_eq!(style.css_font(13.0, "Arial"), "italic bold 13px Inter");
        assert_eq!(CellStyle::default().css_font(11.0, "Arial"), "11px Arial");
    }

    #[test]
    fn style_deserializes_from_partial_json() {
        let style: CellStyle =
            serde_json::from_str(r#"{"align":"right","wrap":true,"decoration":"underline"}"#)
                .unwrap();
        assert_eq!(style.align, HAlign::Right);
        assert!(style.wrap);
        assert_eq!(style.decoration, TextDecoration::Underline);
        assert_eq!(style.font_size_or(11.0), 11.0);
    }
}
