//! Data model for the grid: cells, styles, merges, selection.

mod cell;
mod grid;
mod selection;
mod style;

pub use cell::*;
pub use grid::*;
pub use selection::*;
pub use style::*;
