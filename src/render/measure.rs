//! Text measurement helpers: a bounded measurement cache and a
//! deterministic monospace measurer for headless layout.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::surface::TextMeasure;

/// Default number of cached `(font, text)` widths.
pub const TEXT_MEASURE_CACHE_CAP: usize = 4096;

/// Insertion-order cache of measured widths keyed by `font + text`.
/// Lookups do not promote entries; the oldest insert is evicted first.
pub struct TextMeasureCache {
    entries: HashMap<Rc<str>, f64>,
    order: VecDeque<Rc<str>>,
    max_entries: usize,
    scratch: String,
}

impl TextMeasureCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
            scratch: String::new(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn get(&mut self, font: &str, text: &str) -> Option<f64> {
        if self.max_entries == 0 {
            return None;
        }
        let key = Self::build_key(&mut self.scratch, font, text);
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, font: &str, text: &str, width: f64) {
        if self.max_entries == 0 {
            return;
        }
        let key = Self::build_key(&mut self.scratch, font, text);
        if self.entries.contains_key(key) {
            return;
        }
        let key_rc: Rc<str> = key.into();
        self.entries.insert(Rc::clone(&key_rc), width);
        self.order.push_back(key_rc);
        self.enforce_cap();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build_key<'a>(scratch: &'a mut String, font: &str, text: &str) -> &'a str {
        scratch.clear();
        scratch.reserve(font.len() + 1 + text.len());
        scratch.push_str(font);
        scratch.push('\n');
        scratch.push_str(text);
        scratch.as_str()
    }

    fn enforce_cap(&mut self) {
        while self.entries.len() > self.max_entries {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

/// Wraps any measurer with a [`TextMeasureCache`].
pub struct CachedMeasure<M> {
    inner: M,
    cache: TextMeasureCache,
}

impl<M: TextMeasure> CachedMeasure<M> {
    pub fn new(inner: M) -> Self {
        Self::with_capacity(inner, TEXT_MEASURE_CACHE_CAP)
    }

    pub fn with_capacity(inner: M, capacity: usize) -> Self {
        Self {
            inner,
            cache: TextMeasureCache::new(capacity),
        }
    }

    /// Drop cached widths (fonts loaded, DPR changed).
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl<M: TextMeasure> TextMeasure for CachedMeasure<M> {
    fn measure(&mut self, font: &str, text: &str) -> f64 {
        if let Some(width) = self.cache.get(font, text) {
            return width;
        }
        let width = self.inner.measure(font, text);
        self.cache.insert(font, text, width);
        width
    }
}

/// Pixel size named in a CSS font shorthand ("italic bold 13px Inter").
pub fn font_px(font: &str) -> Option<f64> {
    font.split_whitespace()
        .find_map(|token| token.strip_suffix("px")?.parse::<f64>().ok())
}

/// Fixed-advance measurer: every character is equally wide.
///
/// With `per_px` set, the advance scales with the font size named in the
/// font string, so zoomed fonts measure wider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    advance: f64,
    per_px: bool,
}

impl MonospaceMeasure {
    /// Every character is `advance` pixels wide regardless of font.
    pub fn new(advance: f64) -> Self {
        Self {
            advance,
            per_px: false,
        }
    }

    /// Every character is `ratio × font size` pixels wide.
    pub fn proportional(ratio: f64) -> Self {
        Self {
            advance: ratio,
            per_px: true,
        }
    }

    fn char_width(&self, font: &str) -> f64 {
        if self.per_px {
            font_px(font).unwrap_or(0.0) * self.advance
        } else {
            self.advance
        }
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(7.0)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&mut self, font: &str, text: &str) -> f64 {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        f64::from(chars) * self.char_width(font)
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

    #[test]
    fn text_measure_cache_reuses_entries() {
        let mut cache = TextMeasureCache::new(2);
        assert_eq!(cache.get("11px Arial", "hello"), None);
        cache.insert("11px Arial", "hello", 12.0);
        assert_eq!(cache.get("11px Arial", "hello"), Some(12.0));
        cache.insert("11px Arial", "hello", 22.0);
        assert_eq!(cache.get("11px Arial", "hello"), Some(12.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn text_measure_cache_enforces_cap() {
        let mut cache = TextMeasureCache::new(2);
        cache.insert("11px Arial", "a", 1.0);
        cache.insert("11px Arial", "b", 2.0);
        cache.insert("11px Arial", "c", 3.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("11px Arial", "a"), None);
        assert_eq!(cache.get("11px Arial", "c"), Some(3.0));
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let mut cache = TextMeasureCache::new(0);
        cache.insert("f", "a", 1.0);
        assert!(cache.is_empty());
        assert_eq!(cache.get("f", "a"), None);
    }

    #[test]
    fn cached_measure_fills_cache() {
        let mut m = CachedMeasure::new(MonospaceMeasure::new(5.0));
        assert_eq!(m.measure("11px Arial", "abcd"), 20.0);
        assert_eq!(m.measure("11px Arial", "abcd"), 20.0);
        assert_eq!(m.cached_entries(), 1);
        m.invalidate();
        assert_eq!(m.cached_entries(), 0);
    }

    #[test]
    fn monospace_counts_chars_not_bytes() {
        let mut m = MonospaceMeasure::new(7.0);
        assert_eq!(m.measure("x", "héllo"), 35.0);
        let mut p = MonospaceMeasure::proportional(0.5);
        assert_eq!(p.measure("bold 20px Arial", "ab"), 20.0);
        assert_eq!(font_px("italic 13.5px Inter"), Some(13.5));
        assert_eq!(font_px("Inter"), None);
    }
}
