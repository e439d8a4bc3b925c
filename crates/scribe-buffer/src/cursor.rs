//! Caret and position types.
//!
//! `Position` is 0-indexed line/column in characters. User-facing output
//! (status bar, gutter) adds one.

use serde::{Deserialize, Serialize};

/// A position in the text buffer (line and column, both 0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The caret, with an optional selection anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Current caret position
    pub position: Position,

    /// Selection anchor. Text between anchor and position is selected.
    pub anchor: Option<Position>,

    /// Column to aim for when moving vertically through shorter lines.
    pub preferred_column: Option<usize>,
}

impl Cursor {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            anchor: None,
            preferred_column: None,
        }
    }

    /// Moves the caret, clearing any selection.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
        self.anchor = None;
        self.preferred_column = None;
    }

    /// Moves the caret vertically, remembering the column it started from.
    pub fn move_vertically(&mut self, line: usize, line_len: usize) {
        let column = *self.preferred_column.get_or_insert(self.position.column);
        self.position = Position::new(line, column.min(line_len));
        self.anchor = None;
    }

    /// Moves the caret while extending the selection.
    pub fn select_to(&mut self, position: Position) {
        if self.anchor.is_none() {
            self.anchor = Some(self.position);
        }
        self.position = position;
    }

    /// Selects everything up to `end`.
    pub fn select_all(&mut self, end: Position) {
        self.anchor = Some(Position::ZERO);
        self.position = end;
        self.preferred_column = None;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Returns true if a non-empty range is selected.
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|anchor| anchor != self.position)
    }

    /// Returns the selected range as (start, end), start first.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        self.anchor
            .filter(|anchor| *anchor != self.position)
            .map(|anchor| (anchor.min(self.position), anchor.max(self.position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 5) < Position::new(2, 0));
        assert!(Position::new(1, 5) < Position::new(1, 10));
        assert_eq!(Position::new(3, 0).to_string(), "4:1");
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let mut cursor = Cursor::new(Position::new(2, 3));
        cursor.select_to(Position::new(1, 5));

        assert!(cursor.has_selection());
        assert_eq!(
            cursor.selection_range(),
            Some((Position::new(1, 5), Position::new(2, 3)))
        );
    }

    #[test]
    fn test_vertical_move_keeps_preferred_column() {
        let mut cursor = Cursor::new(Position::new(0, 8));
        cursor.move_vertically(1, 2);
        assert_eq!(cursor.position, Position::new(1, 2));

        cursor.move_vertically(2, 20);
        assert_eq!(cursor.position, Position::new(2, 8));
    }
}
