//! `SheetGrid`: the wasm-exported widget.
//!
//! Two canvases live inside the host container: the grid surface, and on
//! top of it the editor surface shown over the cell being edited. DOM
//! events are forwarded to [`GridState`]; repaints are coalesced into one
//! animation frame.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

use crate::config::GridConfig;
use crate::error::{Result, SheetError};
use crate::render::CanvasSurface;
use crate::types::{CellPos, CellRange, CellStyle};

use super::events::{self, Listener};
use super::frame::{AnimationFrame, FrameRequest};
use super::state::GridState;

/// Everything the DOM listeners share.
pub(crate) struct Shared {
    pub(crate) state: GridState,
    pub(crate) grid_surface: CanvasSurface,
    pub(crate) editor_surface: CanvasSurface,
    pub(crate) frame: FrameRequest,
    pub(crate) pending_frame: Option<AnimationFrame>,
    /// Frame whose callback is running (or ran); released on the next one.
    pub(crate) spent_frame: Option<AnimationFrame>,
    /// Window-level move/up listeners of the active drag.
    pub(crate) drag_listeners: Vec<Listener>,
    /// Drag listeners already removed from the DOM. One of them may be the
    /// handler currently running, so they are dropped on the next drag.
    pub(crate) retired_listeners: Vec<Listener>,
    pub(crate) on_cell_click: Option<Function>,
    pub(crate) on_cell_double_click: Option<Function>,
}

pub(crate) type SharedRef = Rc<RefCell<Shared>>;

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|dpr| *dpr > 0.0)
        .unwrap_or(1.0)
}

fn create_canvas(document: &Document, class: &str, css: &str) -> Result<HtmlCanvasElement> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| SheetError::Js(format!("{e:?}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| SheetError::Js("created element is not a canvas".into()))?;
    canvas.set_class_name(class);
    let _ = canvas.style().set_css_text(css);
    Ok(canvas)
}

/// Ask for a repaint on the next animation frame. Requests made before the
/// frame fires are folded into it.
pub(crate) fn schedule_paint(shared: &SharedRef) {
    let mut s = shared.borrow_mut();
    if !s.frame.request() {
        return;
    }
    let weak = Rc::downgrade(shared);
    match AnimationFrame::request(move |_timestamp| {
        if let Some(shared) = weak.upgrade() {
            let mut guard = shared.borrow_mut();
            let s = &mut *guard;
            s.spent_frame = s.pending_frame.take();
            if s.frame.begin_frame() {
                draw(s);
            }
        }
    }) {
        Ok(handle) => s.pending_frame = Some(handle),
        Err(e) => {
            s.frame.cancel();
            warn!("animation frame unavailable: {e}");
        }
    }
}

/// Paint both surfaces now.
fn draw(s: &mut Shared) {
    if s.state.needs_render {
        s.state.render(&mut s.grid_surface);
    }
    let style = s.editor_surface.canvas().style();
    let Some(rect) = s.state.editor.session().map(|session| session.editor_rect()) else {
        let _ = style.set_property("display", "none");
        return;
    };
    let dpr = s.grid_surface.dpr();
    s.editor_surface.resize(rect.width, rect.height, dpr);
    let _ = style.set_property("left", &format!("{}px", rect.x));
    let _ = style.set_property("top", &format!("{}px", rect.y));
    let _ = style.set_property("display", "block");
    s.state.render_editor(&mut s.editor_surface, true);
}

/// Spreadsheet grid widget exported to JavaScript.
#[wasm_bindgen]
pub struct SheetGrid {
    shared: SharedRef,
    container: HtmlElement,
    #[allow(dead_code)] // removed from the DOM on drop
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl SheetGrid {
    /// Create a `rows × cols` grid (header row and column included) inside
    /// `container`. `config` is an optional `GridConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        rows: u32,
        cols: u32,
        config: JsValue,
    ) -> std::result::Result<SheetGrid, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<GridConfig>(config).map_err(SheetError::from)?
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SheetError::Js("no document".into()))?;

        let container_style = container.style();
        if container_style
            .get_property_value("position")
            .map_or(true, |p| p.is_empty() || p == "static")
        {
            let _ = container_style.set_property("position", "relative");
        }
        let _ = container_style.set_property("overflow", "hidden");
        let _ = container_style.set_property("outline", "none");
        container.set_tab_index(0);

        let grid_canvas = create_canvas(
            &document,
            "sheetgrid-canvas",
            "position:absolute;left:0;top:0;",
        )?;
        let editor_canvas = create_canvas(
            &document,
            "sheetgrid-editor",
            "position:absolute;display:none;z-index:1;cursor:text;",
        )?;
        container
            .append_child(&grid_canvas)
            .map_err(|e| SheetError::Js(format!("{e:?}")))?;
        container
            .append_child(&editor_canvas)
            .map_err(|e| SheetError::Js(format!("{e:?}")))?;

        let dpr = device_pixel_ratio();
        let width = f64::from(container.client_width());
        let height = f64::from(container.client_height());
        let mut grid_surface = CanvasSurface::new(grid_canvas, dpr)?;
        grid_surface.resize(width, height, dpr);
        let editor_surface = CanvasSurface::new(editor_canvas.clone(), dpr)?;

        let mut state = GridState::new(rows, cols, config)?;
        state.resize(width, height, &mut grid_surface);

        let shared = Rc::new(RefCell::new(Shared {
            state,
            grid_surface,
            editor_surface,
            frame: FrameRequest::new(),
            pending_frame: None,
            spent_frame: None,
            drag_listeners: Vec::new(),
            retired_listeners: Vec::new(),
            on_cell_click: None,
            on_cell_double_click: None,
        }));
        let listeners = events::attach(&shared, &container, &editor_canvas);
        schedule_paint(&shared);

        Ok(SheetGrid {
            shared,
            container,
            listeners,
        })
    }

    /// Repaint synchronously.
    pub fn render(&self) {
        let mut guard = self.shared.borrow_mut();
        let s = &mut *guard;
        s.frame.cancel();
        s.pending_frame = None;
        s.state.invalidate();
        draw(s);
    }

    /// Follow a container size change (logical pixels).
    pub fn resize(&self, width: f64, height: f64) {
        {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            let dpr = device_pixel_ratio();
            s.grid_surface.resize(width, height, dpr);
            s.grid_surface.invalidate_measurements();
            s.editor_surface.invalidate_measurements();
            s.state.resize(width, height, &mut s.grid_surface);
            s.state.invalidate_layout();
        }
        schedule_paint(&self.shared);
    }

    #[wasm_bindgen(js_name = "setZoom")]
    pub fn set_zoom(&self, zoom: f64) {
        {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state.set_zoom(zoom, &mut s.grid_surface);
        }
        schedule_paint(&self.shared);
    }

    pub fn zoom(&self) -> f64 {
        self.shared.borrow().state.viewport.zoom
    }

    #[wasm_bindgen(js_name = "scrollBy")]
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let moved = {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state.scroll_by(dx, dy, &mut s.grid_surface)
        };
        if moved {
            schedule_paint(&self.shared);
        }
    }

    #[wasm_bindgen(js_name = "setScroll")]
    pub fn set_scroll(&self, x: f64, y: f64) {
        {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state.set_scroll(x, y, &mut s.grid_surface);
        }
        schedule_paint(&self.shared);
    }

    // ===== Editor =====

    /// Open the editor on `(row, col)`. Returns false for read-only,
    /// header or out-of-range cells.
    pub fn focus(&self, row: u32, col: u32) -> bool {
        let opened = {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state
                .open_editor(CellPos::new(row, col), &mut s.editor_surface)
        };
        if opened {
            let _ = self.container.focus();
            schedule_paint(&self.shared);
        }
        opened
    }

    /// Commit and close the editor. Returns false when none was open.
    pub fn blur(&self) -> bool {
        let committed = self.shared.borrow_mut().state.commit_edit().is_some();
        if committed {
            schedule_paint(&self.shared);
        }
        committed
    }

    /// Close the editor without committing.
    #[wasm_bindgen(js_name = "cancelEdit")]
    pub fn cancel_edit(&self) -> bool {
        let cancelled = self.shared.borrow_mut().state.cancel_edit().is_some();
        if cancelled {
            schedule_paint(&self.shared);
        }
        cancelled
    }

    /// Replace the text of the open editor.
    #[wasm_bindgen(js_name = "setValue")]
    pub fn set_value(&self, text: &str) -> bool {
        let changed = {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state.set_editor_value(text, &mut s.editor_surface)
        };
        if changed {
            schedule_paint(&self.shared);
        }
        changed
    }

    // ===== Data =====

    #[wasm_bindgen(js_name = "cellValue")]
    pub fn cell_value(&self, row: u32, col: u32) -> std::result::Result<String, JsValue> {
        Ok(self.shared.borrow().state.cell_value(row, col)?)
    }

    #[wasm_bindgen(js_name = "setCellValue")]
    pub fn set_cell_value(&self, row: u32, col: u32, value: &str) -> std::result::Result<(), JsValue> {
        self.shared.borrow_mut().state.set_cell_value(row, col, value)?;
        schedule_paint(&self.shared);
        Ok(())
    }

    /// Replace a cell's style with a `CellStyle` object.
    #[wasm_bindgen(js_name = "setCellStyle")]
    pub fn set_cell_style(&self, row: u32, col: u32, style: JsValue) -> std::result::Result<(), JsValue> {
        let style: CellStyle = serde_wasm_bindgen::from_value(style).map_err(SheetError::from)?;
        {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state
                .set_cell_style(row, col, style, &mut s.editor_surface)?;
        }
        schedule_paint(&self.shared);
        Ok(())
    }

    #[wasm_bindgen(js_name = "mergeCells")]
    pub fn merge_cells(&self, r1: u32, c1: u32, r2: u32, c2: u32) -> std::result::Result<(), JsValue> {
        let range = CellRange::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2));
        let merged = self.shared.borrow_mut().state.merge_cells(range);
        if let Err(e) = &merged {
            warn!("merge rejected: {e}");
        }
        merged?;
        schedule_paint(&self.shared);
        Ok(())
    }

    /// Split the merge region containing `(row, col)`. Returns the former
    /// span as `[r1, c1, r2, c2]`.
    #[wasm_bindgen(js_name = "unmergeCells")]
    pub fn unmerge_cells(&self, row: u32, col: u32) -> std::result::Result<Vec<u32>, JsValue> {
        let span = self.shared.borrow_mut().state.unmerge_cells(row, col)?;
        schedule_paint(&self.shared);
        Ok(vec![span.r1, span.c1, span.r2, span.c2])
    }

    // ===== Selection & observation =====

    /// Select `(r1, c1)..(r2, c2)`, expanded over merges.
    pub fn select(&self, r1: u32, c1: u32, r2: u32, c2: u32) {
        {
            let mut guard = self.shared.borrow_mut();
            let s = &mut *guard;
            s.state
                .selection
                .select_range(&s.state.grid, CellPos::new(r1, c1), CellPos::new(r2, c2));
            s.state.needs_render = true;
        }
        schedule_paint(&self.shared);
    }

    /// Current selection as `[r1, c1, r2, c2]`.
    pub fn selection(&self) -> Option<Vec<u32>> {
        let s = self.shared.borrow();
        let r = s.state.selection.selection()?.absolute();
        Some(vec![r.r1, r.c1, r.r2, r.c2])
    }

    /// Focused cell as `[row, col]`.
    #[wasm_bindgen(js_name = "focusedCell")]
    pub fn focused_cell(&self) -> Option<Vec<u32>> {
        let pos = self.shared.borrow().state.selection.focused()?;
        Some(vec![pos.row, pos.col])
    }

    /// Cell under edit as `[row, col]`.
    #[wasm_bindgen(js_name = "editingCell")]
    pub fn editing_cell(&self) -> Option<Vec<u32>> {
        let pos = self.shared.borrow().state.editor.editing_cell()?;
        Some(vec![pos.row, pos.col])
    }

    /// Style of the focused cell (for toolbar state), or `undefined`.
    #[wasm_bindgen(js_name = "focusedStyle")]
    pub fn focused_style(&self) -> std::result::Result<JsValue, JsValue> {
        let s = self.shared.borrow();
        match s.state.focused_style() {
            Some(style) => Ok(serde_wasm_bindgen::to_value(style).map_err(SheetError::from)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// `callback(row, col)` after a click on a cell. `null` removes it.
    #[wasm_bindgen(js_name = "setOnCellClick")]
    pub fn set_on_cell_click(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_cell_click = callback;
    }

    /// `callback(row, col)` on double click. While set, double click no
    /// longer opens the editor by itself.
    #[wasm_bindgen(js_name = "setOnCellDoubleClick")]
    pub fn set_on_cell_double_click(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_cell_double_click = callback;
    }
}

impl Drop for SheetGrid {
    fn drop(&mut self) {
        if let Ok(mut s) = self.shared.try_borrow_mut() {
            s.frame.cancel();
            s.pending_frame = None;
            s.drag_listeners.clear();
            s.retired_listeners.clear();
            s.grid_surface.canvas().remove();
            s.editor_surface.canvas().remove();
        }
    }
}
