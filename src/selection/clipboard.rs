//! Copy, cut and paste of selected cells.
//!
//! The table carries `{value, style}` per cell; the TSV rendering is what
//! goes to the plain-text clipboard.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::merge;
use crate::types::{CellPos, CellRange, CellStyle, Grid};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardCell {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// Rectangular block of copied cells, row-major.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardTable {
    pub rows: Vec<Vec<ClipboardCell>>,
}

/// Escape a value for TSV: values with a tab, newline or quote are
/// wrapped in quotes with inner quotes doubled.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains(['\t', '\n', '\r', '"']);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split TSV text into rows of fields, honouring quoted fields.
fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\t' => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }
    row.push(field);
    rows.push(row);
    rows
}

impl ClipboardTable {
    /// Copy `range` out of the grid. Merge children copy as empty cells.
    pub fn from_range(grid: &Grid, range: CellRange) -> Self {
        let rows = (range.r1..=range.r2)
            .map(|row| {
                (range.c1..=range.c2)
                    .map(|col| {
                        let pos = CellPos::new(row, col);
                        match grid.get(pos) {
                            Some(cell) if !merge::is_merge_child(grid, pos) => ClipboardCell {
                                value: cell.value.clone(),
                                style: Some(cell.style.clone()),
                            },
                            _ => ClipboardCell::default(),
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Parse plain text. Styles are left unset so pasting keeps the
    /// destination's formatting.
    pub fn from_tsv(text: &str) -> Self {
        let rows = parse_tsv(text)
            .into_iter()
            .map(|fields| {
                fields
                    .into_iter()
                    .map(|value| ClipboardCell { value, style: None })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn to_tsv(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| escape_cell_value(&c.value))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }
}

pub fn copy_selection(grid: &Grid, range: CellRange) -> ClipboardTable {
    ClipboardTable::from_range(grid, range)
}

/// Copy, then clear the values (read-only cells keep theirs).
pub fn cut_selection(grid: &mut Grid, range: CellRange) -> ClipboardTable {
    let table = ClipboardTable::from_range(grid, range);
    let cleared = grid.clear_values(range);
    debug!("cut {cleared} cells");
    table
}

/// Write `table` with its top-left at `at`, clamped to the grid. Read-only
/// cells and merge children are skipped. Returns the covered range.
pub fn paste_table(grid: &mut Grid, at: CellPos, table: &ClipboardTable) -> Option<CellRange> {
    if table.is_empty() || !grid.in_bounds(at) || at.is_header() {
        return None;
    }
    let mut covered: Option<CellRange> = None;
    for (dr, row) in table.rows.iter().enumerate() {
        let Some(r) = u32::try_from(dr).ok().and_then(|d| at.row.checked_add(d)) else {
            break;
        };
        if r >= grid.rows() {
            break;
        }
        for (dc, cell) in row.iter().enumerate() {
            let Some(c) = u32::try_from(dc).ok().and_then(|d| at.col.checked_add(d)) else {
                break;
            };
            if c >= grid.cols() {
                break;
            }
            let pos = CellPos::new(r, c);
            covered = Some(match covered {
                Some(range) => range.union(&CellRange::single(pos)),
                None => CellRange::single(pos),
            });
            let writable = grid
                .get(pos)
                .is_some_and(|existing| !existing.read_only)
                && !merge::is_merge_child(grid, pos);
            if !writable {
                continue;
            }
            grid.update_cell(pos, |target| {
                target.value.clone_from(&cell.value);
                if let Some(style) = &cell.style {
                    target.style = style.clone();
                }
            });
        }
    }
    if let Some(range) = covered {
        debug!(
            "pasted {}x{} at ({}, {})",
            range.row_count(),
            range.col_count(),
            at.row,
            at.col
        );
    }
    covered
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
    use test_case::test_case;

    #[test_case("plain", "plain"; "untouched")]
    #[test_case("a\tb", "\"a\tb\""; "tab")]
    #[test_case("line\nbreak", "\"line\nbreak\""; "newline")]
    #[test_case("say \"hi\"", "\"say \"\"hi\"\"\""; "quotes")]
    fn escaping(input: &str, expected: &str) {
        assert_eq!(escape_cell_value(input), expected);
    }

    #[test]
    fn tsv_parsing_handles_quotes_and_crlf() {
        let table = ClipboardTable::from_tsv("a\t\"b\nc\"\r\n\"x\"\"y\"\tz\n");
        assert_eq!(table.height(), 2);
        assert_eq!(table.rows[0][1].value, "b\nc");
        assert_eq!(table.rows[1][0].value, "x\"y");
        assert_eq!(table.rows[1][1].value, "z");
        assert!(ClipboardTable::from_tsv("").is_empty());
    }

    #[test]
    fn copy_emits_tsv() {
        let mut grid = Grid::new(5, 5);
        grid.set_value(CellPos::new(1, 1), "a");
        grid.set_value(CellPos::new(1, 2), "b\tc");
        grid.set_value(CellPos::new(2, 2), "d");
        let table = copy_selection(&grid, CellRange { r1: 1, r2: 2, c1: 1, c2: 2 });
        assert_eq!(table.to_tsv(), "a\t\"b\tc\"\n\td");
    }

    #[test]
    fn cut_clears_values() {
        let mut grid = Grid::new(5, 5);
        grid.set_value(CellPos::new(1, 1), "a");
        let table = cut_selection(&mut grid, CellRange { r1: 1, r2: 1, c1: 1, c2: 2 });
        assert_eq!(table.rows[0][0].value, "a");
        assert_eq!(grid.value(CellPos::new(1, 1)), "");
    }

    #[test]
    fn paste_clamps_and_skips_protected_cells() {
        let mut grid = Grid::new(4, 4);
        grid.merge(CellRange { r1: 2, r2: 2, c1: 2, c2: 3 }).unwrap();
        grid.update_cell(CellPos::new(3, 2), |c| c.read_only = true);
        let table = ClipboardTable::from_tsv("1\t2\t3\n4\t5\t6\n7\t8\t9\n10\t11\t12");
        let covered = paste_table(&mut grid, CellPos::new(2, 2), &table).unwrap();
        assert_eq!(covered, CellRange { r1: 2, r2: 3, c1: 2, c2: 3 });
        assert_eq!(grid.value(CellPos::new(2, 2)), "1");
        // merge child and read-only cell untouched
        assert_eq!(grid.value(CellPos::new(2, 3)), "");
        assert_eq!(grid.value(CellPos::new(3, 2)), "");
        assert_eq!(grid.value(CellPos::new(3, 3)), "5");
    }

    #[test]
    fn paste_applies_styles_when_present() {
        let mut grid = Grid::new(4, 4);
        let style = CellStyle {
            bold: true,
            ..CellStyle::default()
        };
        grid.set_style(CellPos::new(1, 1), style.clone());
        grid.set_value(CellPos::new(1, 1), "x");
        let table = copy_selection(&grid, CellRange::single(CellPos::new(1, 1)));
        paste_table(&mut grid, CellPos::new(2, 2), &table);
        assert!(grid.get(CellPos::new(2, 2)).unwrap().style.bold);
        assert_eq!(grid.value(CellPos::new(2, 2)), "x");
    }

    #[test]
    fn table_serializes_camel_case() {
        let table = ClipboardTable::from_tsv("a");
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"rows":[[{"value":"a"}]]}"#);
    }
}
