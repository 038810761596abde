use std::collections::VecDeque;

/// A labelled edit with the state on either side of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord<R> {
    pub label: String,
    pub before: R,
    pub after: R,
}

/// Undo/redo stacks of edit records. Recording a new edit drops the redo stack; the oldest
/// entries fall off once `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct TransactionHistory<R: Clone> {
    undo: VecDeque<TransactionRecord<R>>,
    redo: Vec<TransactionRecord<R>>,
    max_entries: usize,
}

impl<R: Clone> TransactionHistory<R> {
    pub fn new(max_entries: usize) -> Self {
        Self { undo: VecDeque::new(), redo: Vec::new(), max_entries: max_entries.max(1) }
    }

    pub fn record(&mut self, label: impl Into<String>, before: R, after: R) {
        self.undo.push_back(TransactionRecord { label: label.into(), before, after });
        while self.undo.len() > self.max_entries {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Pops the latest edit; the caller restores `before`.
    pub fn undo(&mut self) -> Option<TransactionRecord<R>> {
        let record = self.undo.pop_back()?;
        self.redo.push(record.clone());
        Some(record)
    }

    /// Re-applies the last undone edit; the caller restores `after`.
    pub fn redo(&mut self) -> Option<TransactionRecord<R>> {
        let record = self.redo.pop()?;
        self.undo.push_back(record.clone());
        Some(record)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Labels of undoable edits, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.undo.iter().map(|record| record.label.as_str()).collect()
    }
}

impl<R: Clone> Default for TransactionHistory<R> {
    fn default() -> Self {
        Self::new(128)
    }
}
