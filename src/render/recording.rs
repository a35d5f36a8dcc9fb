//! Headless surface that records draw calls instead of painting.
//!
//! Used by tests and benchmarks to assert on draw order and geometry
//! without a browser.

use crate::types::HAlign;

use super::measure::MonospaceMeasure;
use super::surface::{Surface, TextMeasure, TextPaint};

/// One recorded drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginFrame {
        width: f64,
        height: f64,
        background: String,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: String,
    },
    StrokeRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        line_width: f64,
        color: String,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        line_width: f64,
        color: String,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        color: String,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font: String,
        color: String,
        align: HAlign,
    },
    PushClip {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    PopClip,
}

/// Records every call; measures text with a [`MonospaceMeasure`].
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    measure: MonospaceMeasure,
}

impl RecordingSurface {
    pub fn new(measure: MonospaceMeasure) -> Self {
        Self {
            ops: Vec::new(),
            measure,
        }
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Texts in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Position of the first text op drawing exactly `needle`.
    pub fn text_index(&self, needle: &str) -> Option<usize> {
        self.ops
            .iter()
            .position(|op| matches!(op, DrawOp::Text { text, .. } if text == needle))
    }

    /// Position of the first op matching `pred`.
    pub fn position<F: Fn(&DrawOp) -> bool>(&self, pred: F) -> Option<usize> {
        self.ops.iter().position(pred)
    }

    /// Lines drawn with the given colour.
    pub fn lines_with_color<'a>(&'a self, color: &'a str) -> impl Iterator<Item = &'a DrawOp> {
        self.ops
            .iter()
            .filter(move |op| matches!(op, DrawOp::Line { color: c, .. } if c == color))
    }

    /// True when push/pop clip calls are balanced.
    pub fn clips_balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for op in &self.ops {
            match op {
                DrawOp::PushClip { .. } => depth += 1,
                DrawOp::PopClip => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl TextMeasure for RecordingSurface {
    fn measure(&mut self, font: &str, text: &str) -> f64 {
        self.measure.measure(font, text)
    }
}

impl Surface for RecordingSurface {
    fn begin_frame(&mut self, width: f64, height: f64, background: &str) {
        self.ops.clear();
        self.ops.push(DrawOp::BeginFrame {
            width,
            height,
            background: background.to_string(),
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, color: &str) {
        self.ops.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            line_width,
            color: color.to_string(),
        });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: &str) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            line_width,
            color: color.to_string(),
        });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: &str) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint<'_>) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: paint.font.to_string(),
            color: paint.color.to_string(),
            align: paint.align,
        });
    }

    fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::PushClip { x, y, w, h });
    }

    fn pop_clip(&mut self) {
        self.ops.push(DrawOp::PopClip);
    }
}
