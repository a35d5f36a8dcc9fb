//! Text placement shared by the grid renderer, the overflow pass and the
//! editor painter, so a cell looks the same whether or not it is being
//! edited.

use crate::config::GridConfig;
use crate::layout::CellRect;
use crate::types::{CellStyle, HAlign, TextDecoration};

/// Resolved font for a cell at the current zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFont {
    /// CSS font shorthand
    pub css: String,
    /// Zoomed font size in pixels
    pub size_px: f64,
    /// Zoomed line box height
    pub line_box: f64,
}

impl CellFont {
    pub fn resolve(style: &CellStyle, config: &GridConfig, zoom: f64) -> Self {
        let size_px = style.font_size_or(config.font_size) * zoom;
        Self {
            css: style.css_font(size_px, &config.font_family),
            size_px,
            line_box: config.line_box(size_px),
        }
    }
}

/// X the text is anchored at for the given alignment (Canvas `textAlign`
/// semantics).
pub fn anchor_x(rect: &CellRect, padding: f64, align: HAlign) -> f64 {
    match align {
        HAlign::Left => rect.x + padding,
        HAlign::Center => rect.x + rect.width / 2.0,
        HAlign::Right => rect.right() - padding,
    }
}

/// Left edge of a line of `width` anchored at `anchor`.
pub fn line_left(anchor: f64, align: HAlign, width: f64) -> f64 {
    match align {
        HAlign::Left => anchor,
        HAlign::Center => anchor - width / 2.0,
        HAlign::Right => anchor - width,
    }
}

/// Vertical centre of the first of `count` lines stacked in the middle of
/// `rect`.
pub fn first_line_center(rect: &CellRect, count: usize, line_box: f64) -> f64 {
    let count = u32::try_from(count.max(1)).unwrap_or(u32::MAX);
    let block = f64::from(count) * line_box;
    rect.y + (rect.height - block) / 2.0 + line_box / 2.0
}

/// Y of the decoration stroke for a line centred at `center_y`.
pub fn decoration_y(decoration: TextDecoration, center_y: f64, size_px: f64) -> Option<f64> {
    match decoration {
        TextDecoration::None => None,
        TextDecoration::Underline => Some(center_y + size_px * 0.5),
        TextDecoration::Strikethrough => Some(center_y),
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

    fn rect() -> CellRect {
        CellRect {
            x: 100.0,
            y: 20.0,
            width: 80.0,
            height: 24.0,
        }
    }

    #[test]
    fn anchors_follow_alignment() {
        assert_eq!(anchor_x(&rect(), 4.0, HAlign::Left), 104.0);
        assert_eq!(anchor_x(&rect(), 4.0, HAlign::Center), 140.0);
        assert_eq!(anchor_x(&rect(), 4.0, HAlign::Right), 176.0);
        assert_eq!(line_left(140.0, HAlign::Center, 20.0), 130.0);
        assert_eq!(line_left(176.0, HAlign::Right, 20.0), 156.0);
    }

    #[test]
    fn single_line_is_vertically_centred() {
        assert_eq!(first_line_center(&rect(), 1, 12.0), 32.0);
        // two lines of 12 in 24: first centre at 26
        assert_eq!(first_line_center(&rect(), 2, 12.0), 26.0);
    }

    #[test]
    fn font_scales_with_zoom() {
        let config = GridConfig::default();
        let font = CellFont::resolve(&CellStyle::default(), &config, 2.0);
        assert_eq!(font.size_px, 22.0);
        assert_eq!(font.css, "22px Arial, sans-serif");
        assert!((font.line_box - 26.4).abs() < 1e-9);
    }
}
