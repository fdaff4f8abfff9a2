//! Linear undo/redo over shared immutable snapshots.
//!
//! The engine keeps its committed state in an `Arc<S>`. Recording a
//! snapshot is a reference-count bump; the next mutation goes through
//! [`Arc::make_mut`], which copies the state only if a snapshot still shares
//! it. Undo and redo move `Arc`s between the stacks and the live slot, so
//! both are O(1) regardless of state size.
//!
//! ```text
//! record:  undo.push(current)                   redo.clear()
//! undo:    redo.push(current)  current = undo.pop()
//! redo:    undo.push(current)  current = redo.pop()
//! ```

use std::sync::Arc;

/// Undo and redo stacks of shared snapshots.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use conquest_core::history::HistoryManager;
///
/// let mut history = HistoryManager::new();
/// let mut current = Arc::new(1);
///
/// history.record(&current);
/// *Arc::make_mut(&mut current) = 2;
///
/// assert!(history.undo(&mut current));
/// assert_eq!(*current, 1);
/// assert!(history.redo(&mut current));
/// assert_eq!(*current, 2);
/// ```
#[derive(Debug, Clone)]
pub struct HistoryManager<S> {
    undo: Vec<Arc<S>>,
    redo: Vec<Arc<S>>,
}

impl<S> Default for HistoryManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> HistoryManager<S> {
    /// Creates empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Snapshots `current` before a mutation and forgets the redo branch.
    pub fn record(&mut self, current: &Arc<S>) {
        self.undo.push(Arc::clone(current));
        self.redo.clear();
    }

    /// Restores the most recent snapshot. Returns false if there is none.
    pub fn undo(&mut self, current: &mut Arc<S>) -> bool {
        Self::step(&mut self.undo, &mut self.redo, current)
    }

    /// Re-applies the most recently undone state. Returns false if there is none.
    pub fn redo(&mut self, current: &mut Arc<S>) -> bool {
        Self::step(&mut self.redo, &mut self.undo, current)
    }

    fn step(from: &mut Vec<Arc<S>>, to: &mut Vec<Arc<S>>, current: &mut Arc<S>) -> bool {
        let Some(restored) = from.pop() else {
            return false;
        };
        to.push(std::mem::replace(current, restored));
        true
    }

    /// Returns true if [`undo`](Self::undo) would do something.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns true if [`redo`](Self::redo) would do something.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undoable steps.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redoable steps.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
