//! DOM listener wiring for [`SheetGrid`](super::SheetGrid).
//!
//! Listeners hold a weak handle to the shared state so that dropping the
//! widget frees everything. Drags install window-level move/up listeners
//! for their duration only.

use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, WheelEvent};

use crate::editor::KeyInput;
use crate::selection::{PointerDown, PointerUp};

use super::clipboard;
use super::state::KeyResponse;
use super::widget::{schedule_paint, Shared, SharedRef};

/// Pixels per wheel "line" when the browser reports line deltas.
const WHEEL_LINE_HEIGHT: f64 = 16.0;

/// An event listener removed from its target on drop.
pub(crate) struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new<E, F>(target: &EventTarget, kind: &'static str, mut handler: F) -> Self
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if let Ok(event) = event.dyn_into::<E>() {
                handler(event);
            }
        }) as Box<dyn FnMut(Event)>);
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            warn!("could not listen for {kind}");
        }
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }

    /// Stop receiving events while keeping the closure alive, for a
    /// listener that detaches itself from inside its own handler.
    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.detach();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragTarget {
    Grid,
    Editor,
}

fn local_point(element: &Element, event: &MouseEvent) -> (f64, f64) {
    let rect = element.get_bounding_client_rect();
    (
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    )
}

fn with_shared<R>(weak: &Weak<std::cell::RefCell<Shared>>, f: impl FnOnce(&SharedRef) -> R) -> Option<R> {
    weak.upgrade().map(|shared| f(&shared))
}

fn call_cell_callback(callback: Option<js_sys::Function>, row: u32, col: u32) {
    if let Some(callback) = callback {
        if let Err(e) = callback.call2(&JsValue::NULL, &JsValue::from(row), &JsValue::from(col)) {
            warn!("cell callback threw: {e:?}");
        }
    }
}

/// Install window move/up listeners for a drag started on `element`.
fn begin_drag(shared: &SharedRef, element: &Element, target: DragTarget) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = Rc::downgrade(shared);

    let move_listener = {
        let weak = weak.clone();
        let element = element.clone();
        Listener::new(&window, "mousemove", move |event: MouseEvent| {
            let (x, y) = local_point(&element, &event);
            with_shared(&weak, |shared| {
                let changed = {
                    let mut guard = shared.borrow_mut();
                    let s = &mut *guard;
                    match target {
                        DragTarget::Grid => s.state.pointer_move(x, y),
                        DragTarget::Editor => {
                            s.state.editor_pointer_move(x, y, &mut s.editor_surface)
                        }
                    }
                };
                if changed {
                    schedule_paint(shared);
                }
            });
        })
    };

    let up_listener = Listener::new(&window, "mouseup", move |_event: MouseEvent| {
        with_shared(&weak, |shared| {
            let click = {
                let mut guard = shared.borrow_mut();
                let s = &mut *guard;
                // the running closure must outlive this call, so only
                // unregister here and drop it on the next drag
                let active = std::mem::take(&mut s.drag_listeners);
                for listener in &active {
                    listener.detach();
                }
                s.retired_listeners.extend(active);
                match target {
                    DragTarget::Grid => match s.state.pointer_up() {
                        PointerUp::Click(pos) => Some((s.on_cell_click.clone(), pos)),
                        _ => None,
                    },
                    DragTarget::Editor => {
                        s.state.editor_pointer_up();
                        None
                    }
                }
            };
            if let Some((callback, pos)) = click {
                call_cell_callback(callback, pos.row, pos.col);
            }
            schedule_paint(shared);
        });
    });

    let mut s = shared.borrow_mut();
    s.retired_listeners.clear();
    s.drag_listeners = vec![move_listener, up_listener];
}

/// Wire the container and editor canvas. The returned listeners live as
/// long as the widget.
pub(crate) fn attach(
    shared: &SharedRef,
    container: &HtmlElement,
    editor_canvas: &HtmlCanvasElement,
) -> Vec<Listener> {
    let mut listeners = Vec::new();

    // Grid mouse down: selection, header clicks, resize handles
    {
        let weak = Rc::downgrade(shared);
        let container_ref = container.clone();
        listeners.push(Listener::new(container, "mousedown", move |event: MouseEvent| {
            if event.button() != 0 {
                return;
            }
            let _ = container_ref.focus();
            let (x, y) = local_point(&container_ref, &event);
            with_shared(&weak, |shared| {
                let outcome = shared
                    .borrow_mut()
                    .state
                    .pointer_down(x, y, event.shift_key());
                if outcome != PointerDown::Ignored {
                    event.prevent_default();
                    begin_drag(shared, &container_ref, DragTarget::Grid);
                }
                schedule_paint(shared);
            });
        }));
    }

    // Double click: host callback, or open the editor
    {
        let weak = Rc::downgrade(shared);
        let container_ref = container.clone();
        listeners.push(Listener::new(container, "dblclick", move |event: MouseEvent| {
            let (x, y) = local_point(&container_ref, &event);
            with_shared(&weak, |shared| {
                let (callback, pos) = {
                    let s = shared.borrow();
                    let Some(pos) = s.state.cell_at(x, y) else {
                        return;
                    };
                    (s.on_cell_double_click.clone(), pos)
                };
                if callback.is_some() {
                    call_cell_callback(callback, pos.row, pos.col);
                } else {
                    let mut guard = shared.borrow_mut();
                    let s = &mut *guard;
                    s.state.open_editor(pos, &mut s.editor_surface);
                }
                schedule_paint(shared);
            });
        }));
    }

    // Wheel scroll
    {
        let weak = Rc::downgrade(shared);
        listeners.push(Listener::new(container, "wheel", move |event: WheelEvent| {
            let scale = match event.delta_mode() {
                WheelEvent::DOM_DELTA_LINE => WHEEL_LINE_HEIGHT,
                WheelEvent::DOM_DELTA_PAGE => with_shared(&weak, |shared| {
                    shared.borrow().state.viewport.height
                })
                .unwrap_or(1.0),
                _ => 1.0,
            };
            let (mut dx, mut dy) = (event.delta_x() * scale, event.delta_y() * scale);
            if event.shift_key() && dx == 0.0 {
                std::mem::swap(&mut dx, &mut dy);
            }
            event.prevent_default();
            with_shared(&weak, |shared| {
                let moved = {
                    let mut guard = shared.borrow_mut();
                    let s = &mut *guard;
                    s.state.scroll_by(dx, dy, &mut s.editor_surface)
                };
                if moved {
                    schedule_paint(shared);
                }
            });
        }));
    }

    // Keyboard: grid navigation or editor keys
    {
        let weak = Rc::downgrade(shared);
        listeners.push(Listener::new(container, "keydown", move |event: KeyboardEvent| {
            let input = KeyInput::from_event(&event);
            with_shared(&weak, |shared| {
                let response = {
                    let mut guard = shared.borrow_mut();
                    let s = &mut *guard;
                    s.state.key_down(&input, &mut s.editor_surface)
                };
                match response {
                    KeyResponse::Ignored => return,
                    KeyResponse::Handled => {}
                    KeyResponse::WriteClipboard(text) => clipboard::write_text(shared, text),
                    KeyResponse::ReadClipboard => clipboard::read_text(shared),
                }
                event.prevent_default();
                schedule_paint(shared);
            });
        }));
    }

    // Editor canvas: caret placement and text selection drag
    {
        let weak = Rc::downgrade(shared);
        let canvas_ref = editor_canvas.clone();
        let container_ref = container.clone();
        listeners.push(Listener::new(editor_canvas, "mousedown", move |event: MouseEvent| {
            event.stop_propagation();
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let _ = container_ref.focus();
            let (x, y) = local_point(&canvas_ref, &event);
            with_shared(&weak, |shared| {
                {
                    let mut guard = shared.borrow_mut();
                    let s = &mut *guard;
                    s.state
                        .editor_pointer_down(x, y, event.shift_key(), &mut s.editor_surface);
                }
                begin_drag(shared, &canvas_ref, DragTarget::Editor);
                schedule_paint(shared);
            });
        }));
    }
    {
        let weak = Rc::downgrade(shared);
        let canvas_ref = editor_canvas.clone();
        listeners.push(Listener::new(editor_canvas, "dblclick", move |event: MouseEvent| {
            event.stop_propagation();
            let (x, y) = local_point(&canvas_ref, &event);
            with_shared(&weak, |shared| {
                {
                    let mut guard = shared.borrow_mut();
                    let s = &mut *guard;
                    s.state.editor_double_click(x, y, &mut s.editor_surface);
                }
                schedule_paint(shared);
            });
        }));
    }

    listeners
}
