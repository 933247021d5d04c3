//! Snapshot-based undo/redo.

use cellgrid_engine::engine::Sheet;

/// Maximum number of undo entries to keep
pub(crate) const MAX_UNDO_STACK: usize = 100;

/// Two stacks of full sheet snapshots.
#[derive(Clone, Debug)]
pub struct History {
    undo_stack: Vec<Sheet>,
    redo_stack: Vec<Sheet>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record `sheet` as the state before a mutation. Clears redo and drops
    /// the oldest entry once the limit is exceeded.
    pub fn snapshot(&mut self, sheet: &Sheet) {
        self.undo_stack.push(sheet.clone());
        self.redo_stack.clear();
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        log::debug!("history snapshot ({} undo entries)", self.undo_stack.len());
    }

    /// Pop the last snapshot, remembering `current` for redo.
    pub fn undo(&mut self, current: &Sheet) -> Option<Sheet> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Pop the last undone state, remembering `current` for undo.
    pub fn redo(&mut self, current: &Sheet) -> Option<Sheet> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        History::new(MAX_UNDO_STACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_engine::engine::CellRef;

    fn sheet_with_value(value: &str) -> Sheet {
        let sheet = Sheet::new(1, 1);
        sheet.set_value(&CellRef::new(0, 0), value.to_string());
        sheet
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::default();
        let before = sheet_with_value("before");
        let after = sheet_with_value("after");

        history.snapshot(&before);
        let restored = history.undo(&after).unwrap();
        assert_eq!(restored, before);
        assert!(history.can_redo());

        let redone = history.redo(&restored).unwrap();
        assert_eq!(redone, after);
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_empty_stacks() {
        let mut history = History::default();
        let sheet = Sheet::new(1, 1);
        assert!(history.undo(&sheet).is_none());
        assert!(history.redo(&sheet).is_none());
        assert_eq!((history.undo_len(), history.redo_len()), (0, 0));
    }

    #[test]
    fn test_snapshot_clears_redo() {
        let mut history = History::default();
        history.snapshot(&sheet_with_value("a"));
        history.undo(&sheet_with_value("b"));
        history.snapshot(&sheet_with_value("c"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(2);
        for value in ["1", "2", "3"] {
            history.snapshot(&sheet_with_value(value));
        }
        assert_eq!(history.undo_len(), 2);
        let current = sheet_with_value("4");
        let last = history.undo(&current).unwrap();
        let first = history.undo(&last).unwrap();
        assert_eq!(first.value(&CellRef::new(0, 0)).as_deref(), Some("2"));
        assert!(!history.can_undo());
    }
}
