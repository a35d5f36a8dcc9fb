//! Selection controller: pointer drag, header clicks, keyboard navigation
//! and clipboard operations over the selected rectangle. Every selection it
//! produces is expanded so no merge region is sliced.

mod clipboard;
mod controller;
mod expand;
mod keyboard;

pub use clipboard::{
    copy_selection, cut_selection, escape_cell_value, paste_table, ClipboardCell, ClipboardTable,
};
pub use controller::{
    hit_test, Axis, DragState, HitTarget, PointerDown, PointerUp, ResizeDrag, SelectMode,
    SelectionController, RESIZE_HANDLE_TOLERANCE,
};
pub use expand::expand;
pub use keyboard::{step, Direction};
