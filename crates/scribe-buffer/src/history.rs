//! Undo/redo history.
//!
//! Edits are recorded in groups. A group is what one undo step reverses:
//! consecutive single-line typing collapses into one group until the
//! history is sealed (caret jump, newline, explicit boundary).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single recorded edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What kind of edit this is
    pub kind: EditKind,
    /// Character index where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    /// Creates an insert edit.
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    /// Creates a delete edit.
    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Number of characters touched by this edit.
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if `next` continues this edit without a gap.
    ///
    /// Inserts continue at the end of the previous insert; deletes continue
    /// backwards (backspace) or in place (forward delete). Newlines always
    /// start a new step.
    pub fn can_coalesce(&self, next: &Edit) -> bool {
        if self.kind != next.kind || self.content.contains('\n') || next.content.contains('\n') {
            return false;
        }

        match self.kind {
            EditKind::Insert => self.position + self.len_chars() == next.position,
            EditKind::Delete => {
                next.position + next.len_chars() == self.position || next.position == self.position
            }
        }
    }

    /// Folds `next` into this edit. Caller checks `can_coalesce` first.
    pub fn coalesce(&mut self, next: Edit) {
        match self.kind {
            EditKind::Insert => self.content.push_str(&next.content),
            EditKind::Delete if next.position < self.position => {
                self.content = next.content + &self.content;
                self.position = next.position;
            }
            EditKind::Delete => self.content.push_str(&next.content),
        }
    }
}

/// Bounded undo/redo stacks of edit groups.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Vec<Edit>>,
    redo_stack: Vec<Vec<Edit>>,
    max_size: usize,
    sealed: bool,
}

impl History {
    /// Creates a new history keeping at most `max_size` undo steps.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            sealed: true,
        }
    }

    /// Records an edit, coalescing it into the open group when possible.
    ///
    /// Any new edit discards the redo stack.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if !self.sealed {
            if let Some(last) = self.undo_stack.back_mut().and_then(|g| g.last_mut()) {
                if last.can_coalesce(&edit) {
                    last.coalesce(edit);
                    return;
                }
            }
        }

        self.undo_stack.push_back(vec![edit]);
        self.sealed = false;
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Records several edits as one undo step.
    pub fn push_group(&mut self, edits: Vec<Edit>) {
        if edits.is_empty() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(edits);
        self.sealed = true;
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Closes the open group so the next edit starts a new undo step.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Pops the most recent group. Edits come back in the order they were
    /// applied; reverse them to undo.
    pub fn undo(&mut self) -> Option<Vec<Edit>> {
        let group = self.undo_stack.pop_back()?;
        self.redo_stack.push(group.clone());
        self.sealed = true;
        Some(group)
    }

    /// Pops the most recently undone group.
    pub fn redo(&mut self) -> Option<Vec<Edit>> {
        let group = self.redo_stack.pop()?;
        self.undo_stack.push_back(group.clone());
        self.sealed = true;
        Some(group)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drops all recorded steps.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.sealed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_coalesces_into_one_step() {
        let mut history = History::new(100);
        history.push(Edit::insert(0, "a"));
        history.push(Edit::insert(1, "b"));
        history.push(Edit::insert(2, "c"));

        let group = history.undo().unwrap();
        assert_eq!(group, vec![Edit::insert(0, "abc")]);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_seal_starts_new_step() {
        let mut history = History::new(100);
        history.push(Edit::insert(0, "a"));
        history.seal();
        history.push(Edit::insert(1, "b"));

        assert_eq!(history.undo().unwrap()[0].content, "b");
        assert_eq!(history.undo().unwrap()[0].content, "a");
    }

    #[test]
    fn test_backspace_coalesces_backwards() {
        let mut e1 = Edit::delete(4, "d");
        let e2 = Edit::delete(3, "c");
        assert!(e1.can_coalesce(&e2));
        e1.coalesce(e2);
        assert_eq!(e1, Edit::delete(3, "cd"));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new(100);
        history.push(Edit::insert(0, "a"));
        history.undo();
        assert!(history.can_redo());

        history.push(Edit::insert(0, "z"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new(2);
        for i in 0..3 {
            history.seal();
            history.push(Edit::insert(i, "x"));
        }
        assert!(history.undo().is_some());
        assert!(history.undo().is_some());
        assert!(history.undo().is_none());
    }
}
