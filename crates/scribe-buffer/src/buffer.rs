//! Rope-backed text buffer.
//!
//! Lines are the unit everything above this layer works in: the gutter
//! counts them, the surface lays them out, the caret lives on one. `ropey`
//! gives O(log n) line lookups, so none of that needs a separate index.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

use crate::history::{Edit, EditKind, History};
use crate::{BufferError, BufferResult, Position};

const DEFAULT_HISTORY: usize = 1000;

/// A text buffer backed by a rope, with undo history and a modified flag.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    history: History,
    modified: bool,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use scribe_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }

    /// Creates an empty buffer keeping at most `max_history` undo steps.
    pub fn with_history(max_history: usize) -> Self {
        Self {
            rope: Rope::new(),
            history: History::new(max_history),
            modified: false,
        }
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a line (0-indexed), including its trailing newline.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(self.rope.slice(range).into())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts the
    /// empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the length of a line in characters, excluding its line break.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        let line = self.line(line_idx)?;
        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(trimmed.chars().count())
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        if text.is_empty() {
            return Ok(());
        }

        self.history.push(Edit::insert(char_idx, text));
        self.rope.insert(char_idx, text);
        self.modified = true;
        Ok(())
    }

    /// Deletes a character range and returns the removed text.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        if range.is_empty() {
            return Ok(String::new());
        }

        let deleted: String = self.rope.slice(range.clone()).into();
        self.history.push(Edit::delete(range.start, deleted.clone()));
        self.rope.remove(range);
        self.modified = true;
        Ok(deleted)
    }

    /// Replaces the whole content, dropping undo history and the modified
    /// flag. Used when a document is loaded or reset.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.history.clear();
        self.modified = false;
    }

    /// Empties the buffer. Same semantics as `set_text("")`.
    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Ends the current undo step.
    pub fn seal_history(&mut self) {
        self.history.seal();
    }

    // ==================== Undo/Redo ====================

    /// Reverts the last undo step. Returns the character index the caret
    /// should land on.
    pub fn undo(&mut self) -> BufferResult<usize> {
        let group = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        let mut caret = 0;

        for edit in group.iter().rev() {
            match edit.kind {
                EditKind::Insert => {
                    self.rope.remove(edit.position..edit.position + edit.len_chars());
                    caret = edit.position;
                }
                EditKind::Delete => {
                    self.rope.insert(edit.position, &edit.content);
                    caret = edit.position + edit.len_chars();
                }
            }
        }

        self.modified = true;
        Ok(caret)
    }

    /// Re-applies the last undone step. Returns the caret character index.
    pub fn redo(&mut self) -> BufferResult<usize> {
        let group = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        let mut caret = 0;

        for edit in &group {
            match edit.kind {
                EditKind::Insert => {
                    self.rope.insert(edit.position, &edit.content);
                    caret = edit.position + edit.len_chars();
                }
                EditKind::Delete => {
                    self.rope.remove(edit.position..edit.position + edit.len_chars());
                    caret = edit.position;
                }
            }
        }

        self.modified = true;
        Ok(caret)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== Position Conversion ====================

    /// Converts a line/column position to a character index.
    ///
    /// The column may sit at the end of the line (after the last character,
    /// before the line break).
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() || pos.column > self.line_len(pos.line)? {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Converts a character index to a line/column position.
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);
        Ok(Position::new(line, column))
    }

    /// Clamps a position onto the nearest valid one.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.len_lines() - 1);
        let column = pos.column.min(self.line_len(line).unwrap_or(0));
        Position::new(line, column)
    }

    /// Position just past the last character.
    pub fn end_position(&self) -> Position {
        let line = self.len_lines() - 1;
        Position::new(line, self.line_len(line).unwrap_or(0))
    }

    // ==================== State ====================

    /// Returns true if the buffer changed since it was loaded or marked clean.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(s);
        buffer
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_restores_text() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        buffer.seal_history();
        buffer.insert(5, " World").unwrap();

        assert_eq!(buffer.undo().unwrap(), 5);
        assert_eq!(buffer.text(), "Hello");

        assert_eq!(buffer.redo().unwrap(), 11);
        assert_eq!(buffer.text(), "Hello World");
    }

    #[test]
    fn test_set_text_resets_state() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "draft").unwrap();
        assert!(buffer.is_modified());

        buffer.set_text("loaded\ncontent");
        assert!(!buffer.is_modified());
        assert!(!buffer.can_undo());
        assert_eq!(buffer.len_lines(), 2);
    }

    #[test]
    fn test_position_conversion() {
        let buffer = TextBuffer::from("ab\ncde\n");
        assert_eq!(buffer.position_to_char_idx(Position::new(1, 3)).unwrap(), 6);
        assert_eq!(buffer.char_idx_to_position(7).unwrap(), Position::new(2, 0));
        assert!(buffer.position_to_char_idx(Position::new(0, 3)).is_err());
    }

    #[test]
    fn test_clamp() {
        let buffer = TextBuffer::from("ab\ncde");
        assert_eq!(buffer.clamp(Position::new(9, 9)), Position::new(1, 3));
        assert_eq!(buffer.end_position(), Position::new(1, 3));
    }

    #[test]
    fn test_crlf_line_len() {
        let buffer = TextBuffer::from("one\r\ntwo");
        assert_eq!(buffer.line_len(0).unwrap(), 3);
    }
}
