//! # Scribe Buffer
//!
//! Line-based text storage behind every editor surface.
//!
//! The buffer owns a rope, so line lookups and edits stay cheap as a
//! document grows. Surfaces layer caret tracking and viewport geometry on
//! top of it; the buffer itself knows nothing about pixels.

mod buffer;
mod cursor;
mod history;

pub use buffer::TextBuffer;
pub use cursor::{Cursor, Position};
pub use history::{Edit, EditKind, History};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_lines(), 1);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        buffer.delete(5..7).unwrap();
        assert_eq!(buffer.text(), "HelloWorld!");
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("# Title\n\nbody");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(0).unwrap(), "# Title\n");
        assert_eq!(buffer.line_len(0).unwrap(), 7);
        assert_eq!(buffer.line_len(1).unwrap(), 0);
        assert_eq!(buffer.line(2).unwrap(), "body");
    }

    proptest::proptest! {
        #[test]
        fn prop_line_count_tracks_newlines(lines in proptest::collection::vec("[a-z ]{0,12}", 1..40)) {
            let text = lines.join("\n");
            let buffer = TextBuffer::from(text.as_str());
            proptest::prop_assert_eq!(buffer.len_lines(), lines.len());
        }
    }
}
