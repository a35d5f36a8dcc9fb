//! Per-session undo/redo of the edited value.

/// Snapshots kept per stack; the oldest are dropped first.
const MAX_SNAPSHOTS: usize = 256;

/// Full-value snapshots. `undo` holds values *before* each edit.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo: Vec<String>,
    redo: Vec<String>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value as it was before an edit. Any redo branch is
    /// discarded.
    pub fn record(&mut self, previous: &str) {
        if self.undo.len() >= MAX_SNAPSHOTS {
            self.undo.remove(0);
        }
        self.undo.push(previous.to_string());
        self.redo.clear();
    }

    /// Step back: returns the value to restore, moving `current` to the
    /// redo stack.
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let previous = self.undo.pop()?;
        self.redo.push(current.to_string());
        Some(previous)
    }

    /// Step forward after an undo.
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let next = self.redo.pop()?;
        self.undo.push(current.to_string());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
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
    fn undo_then_redo_round_trips() {
        let mut h = EditHistory::new();
        h.record("a");
        assert_eq!(h.undo("ab").as_deref(), Some("a"));
        assert_eq!(h.redo("a").as_deref(), Some("ab"));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn new_edit_discards_redo() {
        let mut h = EditHistory::new();
        h.record("a");
        h.undo("ab");
        h.record("a");
        assert!(!h.can_redo());
        assert_eq!(h.redo("ax"), None);
    }

    #[test]
    fn stack_is_bounded() {
        let mut h = EditHistory::new();
        for i in 0..MAX_SNAPSHOTS + 10 {
            h.record(&i.to_string());
        }
        let mut count = 0;
        let mut current = String::from("x");
        while let Some(prev) = h.undo(&current) {
            current = prev;
            count += 1;
        }
        assert_eq!(count, MAX_SNAPSHOTS);
        assert_eq!(current, "10");
    }
}
