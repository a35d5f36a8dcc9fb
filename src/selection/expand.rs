//! Merge-aware selection expansion.

use crate::merge;
use crate::types::{CellRange, Grid};

/// Grow `range` until no merge region crosses its edge.
///
/// Each pass unions the range with the footprint of every merged cell
/// inside it; growing can pull in new merges, so passes repeat until one
/// adds nothing. The result always encloses `range`, and expanding it
/// again returns it unchanged.
pub fn expand(grid: &Grid, range: CellRange) -> CellRange {
    let mut current = range;
    loop {
        let mut grown = current;
        for pos in current.positions() {
            if merge::is_effectively_merged(grid, pos) {
                let footprint = merge::footprint_rect(grid, pos);
                if !grown.encloses(&footprint) {
                    grown = grown.union(&footprint);
                }
            }
        }
        if grown == current {
            return current;
        }
        current = grown;
    }
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

    fn range(r1: u32, r2: u32, c1: u32, c2: u32) -> CellRange {
        CellRange { r1, r2, c1, c2 }
    }

    #[test]
    fn unmerged_range_is_unchanged() {
        let grid = Grid::new(10, 10);
        let r = range(1, 3, 2, 5);
        assert_eq!(expand(&grid, r), r);
    }

    #[test]
    fn partial_overlap_grows_to_merge() {
        let mut grid = Grid::new(10, 10);
        grid.merge(range(2, 2, 2, 4)).unwrap();
        assert_eq!(expand(&grid, range(2, 5, 3, 5)), range(2, 5, 2, 5));
    }

    #[test]
    fn growth_chains_through_merges() {
        let mut grid = Grid::new(12, 12);
        grid.merge(range(2, 3, 2, 3)).unwrap();
        // only reached after the first merge pulls the range down to row 3
        grid.merge(range(3, 6, 4, 4)).unwrap();
        let expanded = expand(&grid, range(2, 2, 3, 4));
        assert_eq!(expanded, range(2, 6, 2, 4));
        assert_eq!(expand(&grid, expanded), expanded);
    }
}
