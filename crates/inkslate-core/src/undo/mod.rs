//! Undo/redo log.
//!
//! Actions are registered as shared handles so that an editing gesture can
//! keep appending to an action after it has been placed on the undo stack.

mod delete;
mod erase;

pub use delete::DeleteUndoAction;
pub use erase::EraseUndoAction;

use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};
use std::sync::{Arc, Mutex, MutexGuard};

/// Maximum number of undo steps to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// A reversible document change.
pub trait UndoAction: Send {
    /// Revert the change.
    fn undo(&mut self, document: &Document) -> DocumentResult<()>;

    /// Apply the change again after it was undone.
    fn redo(&mut self, document: &Document) -> DocumentResult<()>;

    /// Short human readable label, e.g. for a menu entry.
    fn description(&self) -> &'static str;

    /// Whether the action has nothing to revert.
    fn is_empty(&self) -> bool {
        false
    }
}

/// Handle to an action on the undo stack.
pub type SharedAction = Arc<Mutex<dyn UndoAction>>;

/// Undo and redo stacks.
#[derive(Default)]
pub struct UndoRedoHandler {
    undo_stack: Vec<SharedAction>,
    redo_stack: Vec<SharedAction>,
}

impl UndoRedoHandler {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new action. Clears the redo stack.
    pub fn add_action(&mut self, action: SharedAction) {
        self.undo_stack.push(action);

        // Clear redo stack when new changes are made
        self.redo_stack.clear();

        // Limit undo history size
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last action.
    /// Returns `Ok(false)` if there was nothing to undo.
    pub fn undo(&mut self, document: &Document) -> DocumentResult<bool> {
        let Some(action) = self.undo_stack.pop() else {
            return Ok(false);
        };
        let result = lock_action(&action).and_then(|mut a| a.undo(document));
        match result {
            Ok(()) => {
                self.redo_stack.push(action);
                Ok(true)
            }
            Err(e) => {
                self.undo_stack.push(action);
                Err(e)
            }
        }
    }

    /// Redo the last undone action.
    /// Returns `Ok(false)` if there was nothing to redo.
    pub fn redo(&mut self, document: &Document) -> DocumentResult<bool> {
        let Some(action) = self.redo_stack.pop() else {
            return Ok(false);
        };
        let result = lock_action(&action).and_then(|mut a| a.redo(document));
        match result {
            Ok(()) => {
                self.undo_stack.push(action);
                Ok(true)
            }
            Err(e) => {
                self.redo_stack.push(action);
                Err(e)
            }
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of actions that can be undone.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Label of the action the next undo would revert.
    pub fn undo_description(&self) -> Option<&'static str> {
        let action = self.undo_stack.last()?;
        lock_action(action).ok().map(|a| a.description())
    }
}

fn lock_action(action: &SharedAction) -> DocumentResult<MutexGuard<'_, dyn UndoAction + 'static>> {
    action.lock().map_err(|e| DocumentError::Lock(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts how often it was undone and redone.
    #[derive(Default)]
    struct Counter {
        undone: usize,
        redone: usize,
    }

    impl UndoAction for Counter {
        fn undo(&mut self, _document: &Document) -> DocumentResult<()> {
            self.undone += 1;
            Ok(())
        }

        fn redo(&mut self, _document: &Document) -> DocumentResult<()> {
            self.redone += 1;
            Ok(())
        }

        fn description(&self) -> &'static str {
            "Count"
        }
    }

    #[test]
    fn test_undo_redo_moves_between_stacks() {
        let doc = Document::new();
        let mut log = UndoRedoHandler::new();
        let counter = Arc::new(Mutex::new(Counter::default()));
        log.add_action(counter.clone());

        assert!(log.can_undo());
        assert_eq!(log.undo_description(), Some("Count"));
        assert!(log.undo(&doc).unwrap());
        assert!(!log.can_undo());
        assert!(log.can_redo());
        assert!(!log.undo(&doc).unwrap());

        assert!(log.redo(&doc).unwrap());
        let c = counter.lock().unwrap();
        assert_eq!((c.undone, c.redone), (1, 1));
    }

    #[test]
    fn test_new_action_clears_redo() {
        let doc = Document::new();
        let mut log = UndoRedoHandler::new();
        log.add_action(Arc::new(Mutex::new(Counter::default())));
        log.undo(&doc).unwrap();
        log.add_action(Arc::new(Mutex::new(Counter::default())));
        assert!(!log.can_redo());
    }

    /// Refuses to undo or redo.
    struct Stuck;

    impl UndoAction for Stuck {
        fn undo(&mut self, _document: &Document) -> DocumentResult<()> {
            Err(DocumentError::PageNotFound(3))
        }

        fn redo(&mut self, _document: &Document) -> DocumentResult<()> {
            Err(DocumentError::PageNotFound(3))
        }

        fn description(&self) -> &'static str {
            "Stuck"
        }
    }

    #[test]
    fn test_failed_undo_keeps_action() {
        let doc = Document::new();
        let mut log = UndoRedoHandler::new();
        log.add_action(Arc::new(Mutex::new(Stuck)));

        assert!(matches!(log.undo(&doc), Err(DocumentError::PageNotFound(3))));
        assert_eq!(log.undo_len(), 1);
        assert_eq!(log.undo_description(), Some("Stuck"));
        assert!(!log.can_redo());
    }

    #[test]
    fn test_history_limit() {
        let mut log = UndoRedoHandler::new();
        for _ in 0..MAX_UNDO_HISTORY + 5 {
            log.add_action(Arc::new(Mutex::new(Counter::default())));
        }
        assert_eq!(log.undo_len(), MAX_UNDO_HISTORY);
    }
}
