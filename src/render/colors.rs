//! Colour normalization for cell styles.
//!
//! Hosts hand us whatever the style picker produced: `#RRGGBB`, bare
//! `RRGGBB`, ARGB `#AARRGGBB`, `rgb()/rgba()` or a CSS colour keyword. All
//! of them are turned into strings Canvas 2D accepts directly.

/// A CSS color string (e.g., "#FF0000", "rgba(255, 0, 0, 0.5)")
pub type CssColor = String;

/// Normalize a style colour. Returns `None` for strings Canvas would
/// reject, so callers can fall back to the configured default.
pub fn parse_color(s: &str) -> Option<CssColor> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if s.starts_with('#') {
        parse_hex_color(s)
    } else if s.starts_with("rgb") {
        Some(s.to_string())
    } else if let Some(hex) = parse_hex_color(&format!("#{s}")) {
        Some(hex)
    } else if s.chars().all(|c| c.is_ascii_alphabetic()) {
        // CSS keyword ("red", "transparent")
        Some(s.to_ascii_lowercase())
    } else {
        None
    }
}

fn parse_hex_color(s: &str) -> Option<CssColor> {
    let hex = s.strip_prefix('#')?;

    match hex.len() {
        6 => {
            u32::from_str_radix(hex, 16).ok()?;
            Some(format!("#{}", hex.to_ascii_uppercase()))
        }
        8 => {
            let a = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
            let r = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
            let g = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
            let b = u8::from_str_radix(hex.get(6..8)?, 16).ok()?;

            if a == 255 {
                Some(format!("#{:02X}{:02X}{:02X}", r, g, b))
            } else {
                let alpha = f64::from(a) / 255.0;
                Some(format!("rgba({}, {}, {}, {:.2})", r, g, b, alpha))
            }
        }
        _ => None,
    }
}

/// Fixed colours that are not part of the configurable theme.
pub mod palette {
    pub const WHITE: &str = "#FFFFFF";
    pub const BLACK: &str = "#000000";

    /// "Select all" triangle in the corner cell
    pub const SELECT_ALL_GLYPH: &str = "#B0B0B0";

    /// Header label colour when its row/column is selected
    pub const HEADER_TEXT_SELECTED: &str = "#1A73E8";
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
    fn test_parse_hex_6() {
        assert_eq!(parse_color("#ff0000").unwrap(), "#FF0000");
    }

    #[test]
    fn test_parse_hex_8_opaque() {
        // Fully opaque (FF alpha) should return simple hex
        assert_eq!(parse_color("#FFFF0000").unwrap(), "#FF0000");
    }

    #[test]
    fn test_parse_hex_8_transparent() {
        let color = parse_color("#80FF0000").unwrap();
        assert!(color.starts_with("rgba(255, 0, 0,"));
    }

    #[test]
    fn test_parse_rgba_passthrough() {
        let color = parse_color("rgba(255, 128, 64, 0.5)").unwrap();
        assert_eq!(color, "rgba(255, 128, 64, 0.5)");
    }

    #[test]
    fn test_parse_without_hash() {
        assert_eq!(parse_color("FF0000").unwrap(), "#FF0000");
        // all-letter hex is still hex
        assert_eq!(parse_color("ABCDEF").unwrap(), "#ABCDEF");
    }

    #[test]
    fn test_keywords_and_garbage() {
        assert_eq!(parse_color("Red").unwrap(), "red");
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("12zz"), None);
    }
}
