//! Canvas 2D implementation of [`Surface`].

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{Result, SheetError};

use super::measure::{TextMeasureCache, TEXT_MEASURE_CACHE_CAP};
use super::surface::{Surface, TextMeasure, TextPaint, CRISP_OFFSET};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    measure_cache: TextMeasureCache,
    /// Font last handed to the context; `set_font` reparses, so skip repeats.
    current_font: String,
    clip_depth: usize,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, dpr: f64) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| SheetError::Js("Failed to get 2d context".into()))?
            .ok_or_else(|| SheetError::Js("No 2d context available".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SheetError::Js("Failed to cast to CanvasRenderingContext2d".into()))?;
        ctx.set_text_baseline("middle");
        Ok(Self {
            canvas,
            ctx,
            dpr: if dpr > 0.0 { dpr } else { 1.0 },
            measure_cache: TextMeasureCache::new(TEXT_MEASURE_CACHE_CAP),
            current_font: String::new(),
            clip_depth: 0,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Size the backing store to `width × height` logical pixels at the
    /// current device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        if dpr > 0.0 {
            self.dpr = dpr;
        }
        let physical_w = (width.max(0.0) * self.dpr).round() as u32;
        let physical_h = (height.max(0.0) * self.dpr).round() as u32;
        if self.canvas.width() != physical_w {
            self.canvas.set_width(physical_w);
        }
        if self.canvas.height() != physical_h {
            self.canvas.set_height(physical_h);
        }
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{width}px"));
        let _ = style.set_property("height", &format!("{height}px"));
        // resizing resets context state
        self.current_font.clear();
        self.ctx.set_text_baseline("middle");
    }

    /// Drop cached widths (fonts loaded or DPR changed).
    pub fn invalidate_measurements(&mut self) {
        self.measure_cache.clear();
    }

    fn set_font(&mut self, font: &str) {
        if self.current_font != font {
            self.ctx.set_font(font);
            self.current_font.clear();
            self.current_font.push_str(font);
        }
    }
}

impl TextMeasure for CanvasSurface {
    fn measure(&mut self, font: &str, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        if let Some(width) = self.measure_cache.get(font, text) {
            return width;
        }
        self.set_font(font);
        let width = self
            .ctx
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or(0.0);
        self.measure_cache.insert(font, text, width);
        width
    }
}

impl Surface for CanvasSurface {
    fn begin_frame(&mut self, width: f64, height: f64, background: &str) {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
        let _ = self
            .ctx
            .set_transform(self.dpr, 0.0, 0.0, self.dpr, CRISP_OFFSET, CRISP_OFFSET);
        self.ctx.set_fill_style_str(background);
        self.ctx
            .fill_rect(-CRISP_OFFSET, -CRISP_OFFSET, width + 1.0, height + 1.0);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, color: &str) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: &str) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: &str) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx.move_to(*x0, *y0);
        for (x, y) in rest {
            self.ctx.line_to(*x, *y);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, paint: &TextPaint<'_>) {
        if text.is_empty() {
            return;
        }
        self.set_font(paint.font);
        self.ctx.set_fill_style_str(paint.color);
        self.ctx.set_text_align(paint.align.as_css());
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.rect(x, y, w, h);
        self.ctx.clip();
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            return;
        }
        self.ctx.restore();
        self.clip_depth -= 1;
        // restore() may bring back an older font
        self.current_font.clear();
    }
}
