//! Drawing surface abstraction.
//!
//! The grid renderer and the editor painter only talk to these traits, so
//! the same drawing code runs against a Canvas 2D context in the browser
//! and against [`RecordingSurface`](super::RecordingSurface) in tests.

use crate::types::HAlign;

/// Offset applied to the origin so 1px strokes land on whole device
/// pixels.
pub const CRISP_OFFSET: f64 = 0.5;

/// Text width measurement.
pub trait TextMeasure {
    /// Advance width of `text` rendered in `font` (CSS shorthand), in
    /// logical pixels.
    fn measure(&mut self, font: &str, text: &str) -> f64;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn measure(&mut self, font: &str, text: &str) -> f64 {
        (**self).measure(font, text)
    }
}

/// Paint parameters for one run of text.
#[derive(Debug, Clone, Copy)]
pub struct TextPaint<'a> {
    pub font: &'a str,
    pub color: &'a str,
    pub align: HAlign,
}

/// Immediate-mode drawing primitives in logical pixels.
///
/// Text is always drawn with a vertically centred baseline: `y` is the
/// middle of the line box.
pub trait Surface: TextMeasure {
    /// Reset transform, apply the device pixel ratio plus [`CRISP_OFFSET`],
    /// and clear `width × height` to `background`.
    fn begin_frame(&mut self, width: f64, height: f64, background: &str);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str);

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, color: &str);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: &str);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[(f64, f64)], color: &str);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint<'_>);

    /// Push a rectangular clip. Must be balanced by [`Surface::pop_clip`].
    fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn pop_clip(&mut self);
}

/// Snap a coordinate to the pixel grid.
pub fn crisp(x: f64) -> f64 {
    x.floor()
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
    fn crisp_floors() {
        assert_eq!(crisp(10.7), 10.0);
        assert_eq!(crisp(-0.2), -1.0);
    }
}
