//! Interactive layer: the [`GridState`] context object and, on wasm32, the
//! `SheetGrid` widget that wires it to the DOM.
//!
//! `GridState` owns the grid, sizes, viewport, selection and editor and
//! translates host events into calls on them. The widget forwards DOM
//! events, paints two canvases and bridges the async clipboard.

mod frame;
mod state;

#[cfg(target_arch = "wasm32")]
mod clipboard;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod widget;

pub use frame::FrameRequest;
pub use state::{GridState, KeyResponse};
#[cfg(target_arch = "wasm32")]
pub use widget::SheetGrid;
