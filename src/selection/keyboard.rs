//! Keyboard navigation over the data region.

use crate::merge;
use crate::types::{CellPos, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a DOM key name. Tab/Enter move like the arrows; Shift reverses
    /// them.
    pub fn from_key(key: &str, shift: bool) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "Enter" if shift => Some(Self::Up),
            "Enter" => Some(Self::Down),
            "Tab" if shift => Some(Self::Left),
            "Tab" => Some(Self::Right),
            _ => None,
        }
    }
}

/// The cell one step from `from`, leaving its merge footprint as a unit.
/// Stays on the data region: a step into the headers or past the last
/// row/column returns `from` unchanged.
pub fn step(grid: &Grid, from: CellPos, direction: Direction) -> CellPos {
    let Some(data) = grid.data_range() else {
        return from;
    };
    let footprint = merge::footprint_rect(grid, from);
    let next = match direction {
        Direction::Up => footprint.r1.checked_sub(1).map(|r| CellPos::new(r, from.col)),
        Direction::Down => Some(CellPos::new(footprint.r2 + 1, from.col)),
        Direction::Left => footprint.c1.checked_sub(1).map(|c| CellPos::new(from.row, c)),
        Direction::Right => Some(CellPos::new(from.row, footprint.c2 + 1)),
    };
    next.filter(|p| data.contains(*p)).unwrap_or(from)
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
    use crate::types::CellRange;

    #[test]
    fn steps_clamp_to_data_region() {
        let grid = Grid::new(5, 5);
        assert_eq!(step(&grid, CellPos::new(1, 1), Direction::Up), CellPos::new(1, 1));
        assert_eq!(step(&grid, CellPos::new(1, 1), Direction::Left), CellPos::new(1, 1));
        assert_eq!(step(&grid, CellPos::new(4, 4), Direction::Down), CellPos::new(4, 4));
        assert_eq!(step(&grid, CellPos::new(4, 4), Direction::Right), CellPos::new(4, 4));
        assert_eq!(step(&grid, CellPos::new(2, 2), Direction::Down), CellPos::new(3, 2));
    }

    #[test]
    fn steps_leave_merge_as_unit() {
        let mut grid = Grid::new(10, 10);
        grid.merge(CellRange { r1: 2, r2: 4, c1: 2, c2: 3 }).unwrap();
        assert_eq!(step(&grid, CellPos::new(2, 2), Direction::Down), CellPos::new(5, 2));
        assert_eq!(step(&grid, CellPos::new(3, 3), Direction::Right), CellPos::new(3, 4));
        assert_eq!(step(&grid, CellPos::new(3, 3), Direction::Up), CellPos::new(1, 3));
    }

    #[test]
    fn key_mapping() {
        assert_eq!(Direction::from_key("Tab", false), Some(Direction::Right));
        assert_eq!(Direction::from_key("Tab", true), Some(Direction::Left));
        assert_eq!(Direction::from_key("Enter", true), Some(Direction::Up));
        assert_eq!(Direction::from_key("a", false), None);
    }
}
