//! Text line layout shared by the cell renderer and the text editor.
//!
//! A value is split on hard newlines; with wrapping enabled each hard line
//! is further broken into soft lines by a greedy longest-fit scan. All
//! indices are in chars, not bytes.

use crate::render::TextMeasure;

/// One visual line of a laid-out value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Char index of the first character in the whole value.
    pub start_index: usize,
    /// Char index one past the last character.
    pub end_index: usize,
    /// Which `\n`-delimited line this belongs to.
    pub hard_line_index: usize,
    /// Position among all visual lines.
    pub line_index: usize,
    pub content: String,
}

impl Line {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    pub fn contains(&self, cursor: usize) -> bool {
        cursor >= self.start_index && cursor <= self.end_index
    }
}

/// Byte offsets of every char boundary of `s`, including `s.len()`.
fn char_boundaries(s: &str) -> Vec<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect()
}

/// Longest prefix length (in chars, at least 1) of `chars[start..]` that
/// measures within `max_width`. Widths grow with length, so the longest
/// fit is found by bisection instead of trying every length.
fn longest_fit(
    hard: &str,
    bounds: &[usize],
    start: usize,
    max_width: f64,
    font: &str,
    measure: &mut dyn TextMeasure,
) -> usize {
    let char_count = bounds.len().saturating_sub(1);
    let remaining = char_count.saturating_sub(start);
    let mut fits = |len: usize| {
        let from = bounds.get(start).copied().unwrap_or(0);
        let to = bounds.get(start + len).copied().unwrap_or(hard.len());
        let candidate = hard.get(from..to).unwrap_or("");
        measure.measure(font, candidate) <= max_width
    };
    if fits(remaining) {
        return remaining;
    }
    // Invariant: `low` fits (or is the forced 1), `high` does not.
    let mut low = 1;
    let mut high = remaining;
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if fits(mid) {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Lay out `value` into visual lines.
///
/// Without wrapping every hard line is one [`Line`]. With wrapping, each
/// hard line is broken greedily so every soft line fits `max_width`;
/// a single character wider than the cell still takes a line of its own.
/// An empty hard line yields one empty line.
pub fn compute_lines(
    value: &str,
    wrap: bool,
    max_width: f64,
    font: &str,
    measure: &mut dyn TextMeasure,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for (hard_line_index, hard) in value.split('\n').enumerate() {
        let bounds = char_boundaries(hard);
        let char_count = bounds.len() - 1;

        if !wrap || char_count == 0 {
            lines.push(Line {
                start_index: offset,
                end_index: offset + char_count,
                hard_line_index,
                line_index: lines.len(),
                content: hard.to_string(),
            });
        } else {
            let mut start = 0;
            while start < char_count {
                // assumes prefix width never shrinks as chars are added;
                // kerning or shaping that breaks this may end a line early
                let take = longest_fit(hard, &bounds, start, max_width, font, measure);
                let from = bounds.get(start).copied().unwrap_or(0);
                let to = bounds.get(start + take).copied().unwrap_or(hard.len());
                lines.push(Line {
                    start_index: offset + start,
                    end_index: offset + start + take,
                    hard_line_index,
                    line_index: lines.len(),
                    content: hard.get(from..to).unwrap_or("").to_string(),
                });
                start += take;
            }
        }

        // +1 for the newline separator
        offset += char_count + 1;
    }

    lines
}

/// Reassemble the value from its lines: soft lines join directly, hard
/// lines join with `\n`.
pub fn join_lines(lines: &[Line]) -> String {
    let mut out = String::new();
    let mut prev_hard = None;
    for line in lines {
        if prev_hard.is_some_and(|h| h != line.hard_line_index) {
            out.push('\n');
        }
        out.push_str(&line.content);
        prev_hard = Some(line.hard_line_index);
    }
    out
}

/// Index of the visual line showing `cursor`.
///
/// At a soft-wrap boundary the cursor index is both the end of one line
/// and the start of the next; `prefer_end` picks the earlier line (after
/// End or a vertical move), otherwise the later one wins.
pub fn line_at_cursor(lines: &[Line], cursor: usize, prefer_end: bool) -> usize {
    for (i, line) in lines.iter().enumerate() {
        if !line.contains(cursor) {
            continue;
        }
        let at_soft_end = cursor == line.end_index
            && lines
                .get(i + 1)
                .is_some_and(|next| next.hard_line_index == line.hard_line_index);
        // the next soft line starts at this same index
        if at_soft_end && !prefer_end {
            continue;
        }
        return i;
    }
    lines.len().saturating_sub(1)
}

/// Char offset within `line` closest to `x` (relative to the line's text
/// start). Prefixes are measured one character at a time until the width
/// passes `x`; the nearer of the two surrounding boundaries wins.
pub fn column_at_x(line: &Line, x: f64, font: &str, measure: &mut dyn TextMeasure) -> usize {
    if x <= 0.0 {
        return 0;
    }
    let bounds = char_boundaries(&line.content);
    let mut prev_width = 0.0;
    for (k, end) in bounds.iter().enumerate().skip(1) {
        let width = measure.measure(font, line.content.get(..*end).unwrap_or(""));
        if width > x {
            return if x - prev_width < width - x { k - 1 } else { k };
        }
        prev_width = width;
    }
    line.len()
}

/// Height of `count` stacked line boxes.
pub fn content_height(count: usize, line_box: f64) -> f64 {
    let count = u32::try_from(count.max(1)).unwrap_or(u32::MAX);
    f64::from(count) * line_box
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
    use crate::render::MonospaceMeasure;

    fn layout(value: &str, wrap: bool, width: f64) -> Vec<Line> {
        compute_lines(value, wrap, width, "10px Mono", &mut MonospaceMeasure::new(7.0))
    }

    #[test]
    fn unwrapped_hard_lines() {
        let lines = layout("ab\n\ncde", false, 1.0);
        assert_eq!(lines.len(), 3);
        assert_eq!((lines[0].start_index, lines[0].end_index), (0, 2));
        assert_eq!((lines[1].start_index, lines[1].end_index), (3, 3));
        assert!(lines[1].is_empty());
        assert_eq!((lines[2].start_index, lines[2].end_index), (4, 7));
        assert_eq!(lines[2].hard_line_index, 2);
        assert_eq!(join_lines(&lines), "ab\n\ncde");
    }

    #[test]
    fn wrap_takes_longest_fit() {
        // 70px fits 10 chars of 7px
        let lines = layout("abcdefghijklmnopqrstuvwxy", true, 70.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].content, "abcdefghij");
        assert_eq!(lines[1].start_index, 10);
        assert_eq!(lines[2].content, "uvwxy");
        assert!(lines.iter().all(|l| l.hard_line_index == 0));
        assert_eq!(lines[2].line_index, 2);
    }

    #[test]
    fn wrap_forces_progress_on_narrow_cells() {
        let lines = layout("abc", true, 3.0);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == 1));
    }

    #[test]
    fn empty_value_has_one_line() {
        let lines = layout("", true, 70.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_empty());
    }

    #[test]
    fn multibyte_chars_index_by_char() {
        let lines = layout("héllo wörld", true, 35.0);
        assert_eq!(lines[0].content, "héllo");
        assert_eq!(lines[1].start_index, 5);
        assert_eq!(join_lines(&lines), "héllo wörld");
    }

    #[test]
    fn cursor_at_soft_boundary_follows_affinity() {
        let lines = layout("abcdefghijklmno", true, 70.0);
        assert_eq!(line_at_cursor(&lines, 10, false), 1);
        assert_eq!(line_at_cursor(&lines, 10, true), 0);
        assert_eq!(line_at_cursor(&lines, 3, false), 0);
        assert_eq!(line_at_cursor(&lines, 15, false), 1);
    }

    #[test]
    fn cursor_at_hard_boundary() {
        let lines = layout("ab\ncd", false, 100.0);
        assert_eq!(line_at_cursor(&lines, 2, false), 0);
        assert_eq!(line_at_cursor(&lines, 3, false), 1);
        assert_eq!(line_at_cursor(&lines, 5, true), 1);
    }

    #[test]
    fn column_hit_rounds_to_nearest_boundary() {
        let lines = layout("abcdef", false, 100.0);
        let mut m = MonospaceMeasure::new(7.0);
        assert_eq!(column_at_x(&lines[0], 0.0, "f", &mut m), 0);
        assert_eq!(column_at_x(&lines[0], 3.0, "f", &mut m), 0);
        assert_eq!(column_at_x(&lines[0], 4.0, "f", &mut m), 1);
        assert_eq!(column_at_x(&lines[0], 15.0, "f", &mut m), 2);
        assert_eq!(column_at_x(&lines[0], 500.0, "f", &mut m), 6);
    }
}
