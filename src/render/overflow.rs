//! Overflow border suppression.
//!
//! Unwrapped text wider than its cell spills into empty neighbours in the
//! direction its alignment points (left → rightward, right → leftward,
//! center → both, half each). Every boundary the spill crosses has its
//! grid line hidden on both sides, which gives the usual spreadsheet look
//! of long labels running across blank cells.
//!
//! The map covers the visible region, plus the nearest source on either
//! side of it whose text may run into view. It is recomputed when data,
//! zoom, column widths or the visible range change, not every frame.

use std::collections::HashMap;
use std::ops::Range;

use crate::config::GridConfig;
use crate::layout::GridGeometry;
use crate::types::{Cell, CellPos, Grid, HAlign};

use super::surface::TextMeasure;
use super::text::CellFont;

/// Grid-line edges of a cell that must not be stroked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HiddenEdges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl HiddenEdges {
    pub const ALL: Self = Self {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// How far (zoomed px) a cell's text may draw past its own rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spill {
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

/// Hidden-edge and spill map for one visible region.
#[derive(Debug, Clone, Default)]
pub struct OverflowMap {
    hidden: HashMap<CellPos, HiddenEdges>,
    spill: HashMap<CellPos, Spill>,
    /// Spilling sources outside the visible columns.
    offscreen: Vec<CellPos>,
}

impl OverflowMap {
    /// Scan the visible region of `grid` and record every boundary crossed
    /// by overflowing text. Sources just outside the visible columns are
    /// scanned too, so text that starts off-screen still runs into view.
    pub fn compute(
        grid: &Grid,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
        measure: &mut dyn TextMeasure,
    ) -> Self {
        let mut map = Self::default();
        let rows = geometry.visible_rows();
        let cols = geometry.visible_cols();
        let first = cols.start.max(1);

        for row in rows.start.max(1)..rows.end {
            for col in first..cols.end {
                if let Some(cell) = grid.cell(row, col) {
                    map.scan(cell, grid, geometry, config, measure);
                }
            }
            let outside = [
                nearest_source(grid, row, first, Direction::Left),
                nearest_source(grid, row, cols.end.saturating_sub(1).max(first), Direction::Right),
            ];
            for cell in outside.into_iter().flatten() {
                if map.scan(cell, grid, geometry, config, measure) {
                    map.offscreen.push(cell.pos());
                }
            }
        }
        map
    }

    /// Record the spill of one source cell. Returns whether it spills.
    fn scan(
        &mut self,
        cell: &Cell,
        grid: &Grid,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
        measure: &mut dyn TextMeasure,
    ) -> bool {
        if cell.is_empty() || cell.style.wrap || cell.merge.is_some() {
            return false;
        }
        let zoom = geometry.zoom();
        let padding = config.cell_padding * zoom;
        let font = CellFont::resolve(&cell.style, config, zoom);
        let text_width = cell
            .value
            .split('\n')
            .map(|line| measure.measure(&font.css, line))
            .fold(0.0, f64::max);
        let interior = geometry.col_width(cell.col) - 2.0 * padding;
        let excess = text_width - interior;
        if excess <= 0.0 {
            return false;
        }

        let pos = cell.pos();
        let spill = match cell.style.align {
            HAlign::Left => Spill {
                left: 0.0,
                right: self.walk(grid, geometry, pos, excess, Direction::Right),
            },
            HAlign::Right => Spill {
                left: self.walk(grid, geometry, pos, excess, Direction::Left),
                right: 0.0,
            },
            // Each side gets half; a side that stops early does not
            // hand its remainder to the other.
            HAlign::Center => Spill {
                left: self.walk(grid, geometry, pos, excess / 2.0, Direction::Left),
                right: self.walk(grid, geometry, pos, excess / 2.0, Direction::Right),
            },
        };
        if spill.left > 0.0 || spill.right > 0.0 {
            self.spill.insert(pos, spill);
            return true;
        }
        false
    }

    /// Walk outward from `source` hiding boundaries until `remaining`
    /// is used up or a cell refuses the spill. Returns the spilled width.
    fn walk(
        &mut self,
        grid: &Grid,
        geometry: &GridGeometry<'_>,
        source: CellPos,
        mut remaining: f64,
        direction: Direction,
    ) -> f64 {
        let mut prev = source.col;
        let mut spilled = 0.0;
        while remaining > 0.0 {
            let next = match direction {
                Direction::Right if prev + 1 < grid.cols() => prev + 1,
                // column 0 is the frozen header
                Direction::Left if prev > 1 => prev - 1,
                _ => break,
            };
            let pos = CellPos::new(source.row, next);
            if !grid.get(pos).is_some_and(accepts_spill) {
                break;
            }
            let prev_pos = CellPos::new(source.row, prev);
            match direction {
                Direction::Right => {
                    self.hidden.entry(prev_pos).or_default().right = true;
                    self.hidden.entry(pos).or_default().left = true;
                }
                Direction::Left => {
                    self.hidden.entry(prev_pos).or_default().left = true;
                    self.hidden.entry(pos).or_default().right = true;
                }
            }
            let width = geometry.col_width(next);
            spilled += width;
            remaining -= width;
            prev = next;
        }
        spilled
    }

    /// Hidden edges of `pos`. Header cells hide every edge; the renderer
    /// draws the frozen separator for them instead.
    pub fn edges(&self, pos: CellPos) -> HiddenEdges {
        if pos.is_header() {
            return HiddenEdges::ALL;
        }
        self.hidden.get(&pos).copied().unwrap_or_default()
    }

    pub fn spill(&self, pos: CellPos) -> Spill {
        self.spill.get(&pos).copied().unwrap_or_default()
    }

    /// Cells outside the visible columns whose text reaches into view.
    pub fn offscreen_sources(&self) -> &[CellPos] {
        &self.offscreen
    }

    /// Number of cells with at least one hidden edge (headers excluded).
    pub fn hidden_count(&self) -> usize {
        self.hidden.values().filter(|e| e.any()).count()
    }
}

fn accepts_spill(cell: &Cell) -> bool {
    cell.is_empty() && !cell.style.wrap && cell.merge.is_none()
}

/// First cell past `from` in `direction` that would stop a spill, if its
/// alignment points back toward `from`. Only that cell can spill across.
fn nearest_source(grid: &Grid, row: u32, from: u32, direction: Direction) -> Option<&Cell> {
    let mut col = from;
    loop {
        col = match direction {
            Direction::Left if col > 1 => col - 1,
            Direction::Right if col + 1 < grid.cols() => col + 1,
            _ => return None,
        };
        let cell = grid.cell(row, col)?;
        if accepts_spill(cell) {
            continue;
        }
        let facing = match direction {
            Direction::Left => cell.style.align != HAlign::Right,
            Direction::Right => cell.style.align != HAlign::Left,
        };
        return facing.then_some(cell);
    }
}

/// Inputs that invalidate an [`OverflowMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct OverflowKey {
    grid_version: u64,
    sizes_version: u64,
    zoom_bits: u64,
    rows: Range<u32>,
    cols: Range<u32>,
}

/// Memoizes the overflow map across frames.
#[derive(Debug, Default)]
pub struct OverflowCache {
    key: Option<OverflowKey>,
    map: OverflowMap,
    recomputes: u64,
}

impl OverflowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current map, recomputed only when its inputs changed.
    pub fn get(
        &mut self,
        grid: &Grid,
        geometry: &GridGeometry<'_>,
        config: &GridConfig,
        measure: &mut dyn TextMeasure,
    ) -> &OverflowMap {
        let key = OverflowKey {
            grid_version: grid.version(),
            sizes_version: geometry.sizes.version(),
            zoom_bits: geometry.zoom().to_bits(),
            rows: geometry.visible_rows(),
            cols: geometry.visible_cols(),
        };
        if self.key.as_ref() != Some(&key) {
            self.map = OverflowMap::compute(grid, geometry, config, measure);
            self.key = Some(key);
            self.recomputes += 1;
        }
        &self.map
    }

    /// Force a recompute on next access (config or fonts changed).
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// How many times the map has been rebuilt.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
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
    use crate::layout::{HeaderSizes, Viewport};
    use crate::render::MonospaceMeasure;

    // 7px per char, 4px padding: a 100px column holds 13 chars
    fn setup() -> (Grid, HeaderSizes, Viewport, GridConfig) {
        let config = GridConfig::default();
        let grid = Grid::new(10, 8);
        let sizes = HeaderSizes::new(10, 8, &config);
        (grid, sizes, Viewport::new(2000.0, 600.0), config)
    }

    fn compute(grid: &Grid, sizes: &HeaderSizes, vp: &Viewport, config: &GridConfig) -> OverflowMap {
        let geometry = GridGeometry::new(sizes, vp);
        OverflowMap::compute(grid, &geometry, config, &mut MonospaceMeasure::new(7.0))
    }

    #[test]
    fn short_text_hides_nothing() {
        let (mut grid, sizes, vp, config) = setup();
        grid.set_value(CellPos::new(1, 1), "short");
        let map = compute(&grid, &sizes, &vp, &config);
        assert_eq!(map.hidden_count(), 0);
        assert_eq!(map.spill(CellPos::new(1, 1)), Spill::default());
    }

    #[test]
    fn left_aligned_spills_right_until_exhausted() {
        let (mut grid, sizes, vp, config) = setup();
        // 20 chars = 140px, interior 92px, excess 48 < one column
        grid.set_value(CellPos::new(2, 2), "abcdefghijklmnopqrst");
        let map = compute(&grid, &sizes, &vp, &config);
        assert!(map.edges(CellPos::new(2, 2)).right);
        assert!(map.edges(CellPos::new(2, 3)).left);
        assert!(!map.edges(CellPos::new(2, 3)).right);
        assert!(!map.edges(CellPos::new(2, 2)).left);
        assert_eq!(map.spill(CellPos::new(2, 2)).right, 100.0);
    }

    #[test]
    fn walk_stops_at_non_empty_neighbour() {
        let (mut grid, sizes, vp, config) = setup();
        grid.set_value(CellPos::new(1, 1), &"x".repeat(60));
        grid.set_value(CellPos::new(1, 3), "blocker");
        let map = compute(&grid, &sizes, &vp, &config);
        assert!(map.edges(CellPos::new(1, 2)).left);
        assert!(!map.edges(CellPos::new(1, 2)).right);
        assert!(!map.edges(CellPos::new(1, 3)).left);
    }

    #[test]
    fn walk_stops_at_wrapped_or_merged_neighbour() {
        let (mut grid, sizes, vp, config) = setup();
        grid.set_value(CellPos::new(1, 1), &"x".repeat(40));
        grid.update_cell(CellPos::new(1, 2), |c| c.style.wrap = true);
        grid.set_value(CellPos::new(3, 1), &"x".repeat(40));
        grid.merge(crate::types::CellRange { r1: 3, r2: 4, c1: 2, c2: 3 }).unwrap();
        let map = compute(&grid, &sizes, &vp, &config);
        assert!(!map.edges(CellPos::new(1, 1)).right);
        assert!(!map.edges(CellPos::new(3, 1)).right);
    }

    #[test]
    fn right_aligned_spills_left_but_not_into_header() {
        let (mut grid, sizes, vp, config) = setup();
        grid.set_value(CellPos::new(1, 2), &"x".repeat(60));
        grid.update_cell(CellPos::new(1, 2), |c| c.style.align = HAlign::Right);
        let map = compute(&grid, &sizes, &vp, &config);
        assert!(map.edges(CellPos::new(1, 2)).left);
        assert!(map.edges(CellPos::new(1, 1)).right);
        assert!(!map.edges(CellPos::new(1, 1)).left);
        assert_eq!(map.spill(CellPos::new(1, 2)).left, 100.0);
    }

    #[test]
    fn center_splits_excess_without_transfer() {
        let (mut grid, sizes, vp, config) = setup();
        // 40 chars = 280px, excess 188: 94 per side -> one column each
        grid.set_value(CellPos::new(1, 4), &"x".repeat(40));
        grid.update_cell(CellPos::new(1, 4), |c| c.style.align = HAlign::Center);
        grid.set_value(CellPos::new(1, 3), "full");
        let map = compute(&grid, &sizes, &vp, &config);
        assert!(!map.edges(CellPos::new(1, 4)).left);
        assert!(map.edges(CellPos::new(1, 4)).right);
        assert!(!map.edges(CellPos::new(1, 5)).right);
        assert_eq!(map.spill(CellPos::new(1, 4)), Spill { left: 0.0, right: 100.0 });
    }

    #[test]
    fn sources_scrolled_out_of_view_still_spill_in() {
        let (mut grid, sizes, mut vp, config) = setup();
        vp.width = 300.0;
        // column 1 ends at 148, so only columns 2..6 are visible
        vp.scroll_x = 150.0;
        grid.set_value(CellPos::new(1, 1), &"x".repeat(60));
        // 30 chars = 210px, excess 118 reaches two columns left
        grid.set_value(CellPos::new(2, 7), &"y".repeat(30));
        grid.update_cell(CellPos::new(2, 7), |c| c.style.align = HAlign::Right);
        // points away from the view
        grid.set_value(CellPos::new(3, 7), &"z".repeat(30));
        let map = compute(&grid, &sizes, &vp, &config);

        assert!(map.edges(CellPos::new(1, 3)).left);
        assert!(map.edges(CellPos::new(1, 5)).left);
        assert!(!map.edges(CellPos::new(1, 5)).right);
        assert!(map.edges(CellPos::new(2, 5)).right);
        assert!(!map.edges(CellPos::new(2, 5)).left);
        assert!(!map.edges(CellPos::new(3, 6)).right);
        assert_eq!(
            map.offscreen_sources(),
            &[CellPos::new(1, 1), CellPos::new(2, 7)]
        );
    }

    #[test]
    fn headers_hide_all_edges() {
        let (grid, sizes, vp, config) = setup();
        let map = compute(&grid, &sizes, &vp, &config);
        assert_eq!(map.edges(CellPos::new(0, 3)), HiddenEdges::ALL);
        assert_eq!(map.edges(CellPos::new(5, 0)), HiddenEdges::ALL);
        assert_eq!(map.edges(CellPos::new(5, 5)), HiddenEdges::default());
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let (mut grid, sizes, vp, config) = setup();
        let mut cache = OverflowCache::new();
        let mut m = MonospaceMeasure::new(7.0);
        {
            let geometry = GridGeometry::new(&sizes, &vp);
            cache.get(&grid, &geometry, &config, &mut m);
            cache.get(&grid, &geometry, &config, &mut m);
        }
        assert_eq!(cache.recomputes(), 1);
        grid.set_value(CellPos::new(1, 1), "changed");
        let geometry = GridGeometry::new(&sizes, &vp);
        cache.get(&grid, &geometry, &config, &mut m);
        assert_eq!(cache.recomputes(), 2);
        cache.invalidate();
        cache.get(&grid, &geometry, &config, &mut m);
        assert_eq!(cache.recomputes(), 3);
    }
}
