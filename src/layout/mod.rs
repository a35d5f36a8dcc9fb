//! Layout engine: header-size tables, viewport state and the coordinate
//! engine that maps them to pixel space.
//!
//! This module handles:
//! - Per-column / per-row sizes with cached prefix sums
//! - Viewport state (scroll position, zoom, container size)
//! - Visible index ranges, pixel offsets and inverse hit lookups
//! - Merge-resolved cell rectangles

mod geometry;
mod header_sizes;
mod viewport;

pub use geometry::{CellRect, GridGeometry};
pub use header_sizes::{HeaderSizes, MIN_HEADER_SIZE};
pub use viewport::{Viewport, MAX_ZOOM, MIN_ZOOM};
