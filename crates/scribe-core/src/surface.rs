//! The editable text surface.
//!
//! A surface is what a tab shows: text storage, a caret, and a scrolled
//! viewport laid out in fixed-height lines ("blocks"). The tab manager and
//! the gutter only see the [`TextSurface`] trait. [`EditorSurface`] is the
//! implementation hosts normally use.
//!
//! Surfaces do not call anyone back. Every change that affects layout is
//! queued as a [`SurfaceEvent`] and handed out by `drain_events`, which the
//! owner forwards to the surface's gutter.

use scribe_buffer::{BufferResult, Cursor, Position, TextBuffer};

use crate::config::EditorConfig;
use crate::geometry::{Color, Rect};

/// Layout notifications emitted by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Part of the viewport must be redrawn. A non-zero `dy` means the
    /// content scrolled by that many pixels (negative when it moved up).
    UpdateRequest { rect: Rect, dy: i32 },
    /// The number of lines changed.
    BlockCountChanged(usize),
    /// The caret moved or the text under it changed.
    CursorPositionChanged,
    /// The surface widget was resized.
    Resized,
}

/// A full-width, non-selecting background band behind one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHighlight {
    pub line: usize,
    pub color: Color,
}

/// Caret movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    Up(usize),
    Down(usize),
    Left(usize),
    Right(usize),
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
}

/// Capability the tab manager and the gutter need from an editor widget.
pub trait TextSurface {
    // ==================== Content ====================

    fn text(&self) -> String;

    /// Replaces the content. Resets undo history and the modified flag.
    fn set_text(&mut self, text: &str);

    fn clear(&mut self);

    fn is_empty(&self) -> bool;

    fn is_modified(&self) -> bool;

    fn set_modified(&mut self, modified: bool);

    fn is_read_only(&self) -> bool;

    // ==================== Caret ====================

    /// 0-based line holding the caret.
    fn caret_line(&self) -> usize;

    /// 0-based column of the caret.
    fn caret_column(&self) -> usize;

    fn move_caret(&mut self, movement: CaretMove);

    // ==================== Layout ====================

    /// Number of lines. Never zero.
    fn block_count(&self) -> usize;

    /// First line at least partially inside the viewport.
    fn first_visible_block(&self) -> usize;

    /// Top of `block` in viewport coordinates, scroll offset applied.
    fn block_top(&self, block: usize) -> i32;

    /// Pixel height of `block`.
    fn block_height(&self, block: usize) -> i32;

    /// The text viewport, in its own coordinates.
    fn viewport_rect(&self) -> Rect;

    /// The whole widget area, gutter included.
    fn contents_rect(&self) -> Rect;

    /// Reserves `left` pixels on the left of the contents for a side panel.
    fn set_viewport_margins(&mut self, left: i32);

    fn set_extra_selections(&mut self, selections: Vec<LineHighlight>);

    fn scroll_by(&mut self, dy: i32);

    fn resize(&mut self, width: i32, height: i32);

    /// Grows (positive) or shrinks (negative) the font by whole zoom steps.
    fn zoom(&mut self, steps: i32);

    /// Takes the notifications queued since the last call.
    fn drain_events(&mut self) -> Vec<SurfaceEvent>;

    // ==================== Editing ====================

    /// Inserts at the caret, replacing the selection if there is one.
    fn insert_text(&mut self, text: &str) -> BufferResult<()>;

    /// Deletes the selection, or the character before the caret.
    fn delete_backward(&mut self) -> BufferResult<()>;

    fn delete_selection(&mut self) -> BufferResult<()>;

    fn selected_text(&self) -> Option<String>;

    fn select_all(&mut self);

    fn undo(&mut self) -> BufferResult<()>;

    fn redo(&mut self) -> BufferResult<()>;
}

/// Rope-backed surface with uniform line heights.
#[derive(Debug, Clone)]
pub struct EditorSurface {
    buffer: TextBuffer,
    cursor: Cursor,
    font_size: f32,
    line_height: i32,
    scroll_y: i32,
    width: i32,
    height: i32,
    margin_left: i32,
    read_only: bool,
    extra_selections: Vec<LineHighlight>,
    pending: Vec<SurfaceEvent>,
    config: EditorConfig,
}

impl EditorSurface {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            buffer: TextBuffer::with_history(config.undo_limit),
            cursor: Cursor::default(),
            font_size: config.font_size,
            line_height: config.line_height_for(config.font_size),
            scroll_y: 0,
            width: config.viewport_width.max(1),
            height: config.viewport_height.max(1),
            margin_left: 0,
            read_only: false,
            extra_selections: Vec::new(),
            pending: Vec::new(),
            config: config.clone(),
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn extra_selections(&self) -> &[LineHighlight] {
        &self.extra_selections
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    /// Pixels scrolled past the top of the document.
    pub fn scroll_offset(&self) -> i32 {
        self.scroll_y
    }

    pub fn viewport_margin(&self) -> i32 {
        self.margin_left
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Places the caret, clamped onto the text.
    pub fn set_caret(&mut self, position: Position) {
        let before = self.cursor.position;
        self.cursor.move_to(self.buffer.clamp(position));
        self.caret_moved(before);
    }

    /// Lines intersecting the viewport, as (line index, display text).
    ///
    /// Line breaks are dropped and tabs are expanded to the configured tab
    /// stop.
    pub fn visible_lines(&self) -> Vec<(usize, String)> {
        let first = self.first_visible_block();
        let rows = (self.height + self.line_height - 1) / self.line_height;
        (first..self.block_count().min(first + rows as usize + 1))
            .filter(|&line| self.block_top(line) < self.height)
            .filter_map(|line| {
                let text = self.buffer.line(line).ok()?;
                let text = text.trim_end_matches(['\n', '\r']);
                Some((line, expand_tabs(text, self.config.tab_size)))
            })
            .collect()
    }

    // ==================== Internals ====================

    fn caret_index(&self) -> usize {
        self.buffer
            .position_to_char_idx(self.cursor.position)
            .unwrap_or_else(|_| self.buffer.len_chars())
    }

    fn max_scroll(&self) -> i32 {
        let document_height = self.block_count() as i32 * self.line_height;
        (document_height - self.height).max(0)
    }

    fn scroll_to(&mut self, target: i32) {
        let target = target.clamp(0, self.max_scroll());
        let delta = target - self.scroll_y;
        if delta != 0 {
            self.scroll_y = target;
            self.pending.push(SurfaceEvent::UpdateRequest {
                rect: self.viewport_rect(),
                dy: -delta,
            });
        }
    }

    fn ensure_caret_visible(&mut self) {
        let top = self.cursor.position.line as i32 * self.line_height;
        if top < self.scroll_y {
            self.scroll_to(top);
        } else if top + self.line_height > self.scroll_y + self.height {
            self.scroll_to(top + self.line_height - self.height);
        }
    }

    fn caret_moved(&mut self, before: Position) {
        if self.cursor.position != before {
            self.buffer.seal_history();
            self.pending.push(SurfaceEvent::CursorPositionChanged);
        }
        self.ensure_caret_visible();
    }

    /// Queues the notifications for an edit that started on `first_line`.
    fn text_changed(&mut self, first_line: usize, old_block_count: usize) {
        let block_count = self.block_count();
        if block_count != old_block_count {
            self.pending.push(SurfaceEvent::BlockCountChanged(block_count));
            self.scroll_to(self.scroll_y);
        }

        let viewport = self.viewport_rect();
        let top = self.block_top(first_line).max(0);
        if top < viewport.height {
            self.pending.push(SurfaceEvent::UpdateRequest {
                rect: Rect::new(0, top, viewport.width, viewport.height - top),
                dy: 0,
            });
        }

        self.pending.push(SurfaceEvent::CursorPositionChanged);
        self.ensure_caret_visible();
    }

    fn reset_content(&mut self, text: &str) {
        let old_block_count = self.block_count();
        self.buffer.set_text(text);
        self.cursor = Cursor::default();
        self.scroll_y = 0;

        if self.block_count() != old_block_count {
            self.pending
                .push(SurfaceEvent::BlockCountChanged(self.block_count()));
        }
        self.pending.push(SurfaceEvent::UpdateRequest {
            rect: self.viewport_rect(),
            dy: 0,
        });
        self.pending.push(SurfaceEvent::CursorPositionChanged);
    }

    fn place_caret_at_index(&mut self, char_idx: usize) -> BufferResult<()> {
        let position = self.buffer.char_idx_to_position(char_idx)?;
        self.cursor.move_to(self.buffer.clamp(position));
        Ok(())
    }
}

impl TextSurface for EditorSurface {
    fn text(&self) -> String {
        self.buffer.text().into_owned()
    }

    fn set_text(&mut self, text: &str) {
        self.reset_content(text);
    }

    fn clear(&mut self) {
        self.reset_content("");
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    fn set_modified(&mut self, modified: bool) {
        self.buffer.set_modified(modified);
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn caret_line(&self) -> usize {
        self.cursor.position.line
    }

    fn caret_column(&self) -> usize {
        self.cursor.position.column
    }

    fn move_caret(&mut self, movement: CaretMove) {
        let before = self.cursor.position;
        let last_line = self.buffer.len_lines() - 1;

        match movement {
            CaretMove::Up(n) => {
                let line = before.line.saturating_sub(n);
                let len = self.buffer.line_len(line).unwrap_or(0);
                self.cursor.move_vertically(line, len);
            }
            CaretMove::Down(n) => {
                let line = (before.line + n).min(last_line);
                let len = self.buffer.line_len(line).unwrap_or(0);
                self.cursor.move_vertically(line, len);
            }
            CaretMove::Left(n) => {
                let idx = self.caret_index().saturating_sub(n);
                let _ = self.place_caret_at_index(idx);
            }
            CaretMove::Right(n) => {
                let idx = (self.caret_index() + n).min(self.buffer.len_chars());
                let _ = self.place_caret_at_index(idx);
            }
            CaretMove::LineStart => self.cursor.move_to(Position::new(before.line, 0)),
            CaretMove::LineEnd => {
                let len = self.buffer.line_len(before.line).unwrap_or(0);
                self.cursor.move_to(Position::new(before.line, len));
            }
            CaretMove::DocumentStart => self.cursor.move_to(Position::ZERO),
            CaretMove::DocumentEnd => self.cursor.move_to(self.buffer.end_position()),
        }

        self.caret_moved(before);
    }

    fn block_count(&self) -> usize {
        self.buffer.len_lines()
    }

    fn first_visible_block(&self) -> usize {
        (self.scroll_y / self.line_height) as usize
    }

    fn block_top(&self, block: usize) -> i32 {
        block as i32 * self.line_height - self.scroll_y
    }

    fn block_height(&self, _block: usize) -> i32 {
        self.line_height
    }

    fn viewport_rect(&self) -> Rect {
        Rect::new(0, 0, (self.width - self.margin_left).max(0), self.height)
    }

    fn contents_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn set_viewport_margins(&mut self, left: i32) {
        self.margin_left = left.clamp(0, self.width);
    }

    fn set_extra_selections(&mut self, selections: Vec<LineHighlight>) {
        self.extra_selections = selections;
    }

    fn scroll_by(&mut self, dy: i32) {
        self.scroll_to(self.scroll_y + dy);
    }

    fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.margin_left = self.margin_left.min(self.width);
        self.pending.push(SurfaceEvent::Resized);
        self.scroll_to(self.scroll_y);
    }

    fn zoom(&mut self, steps: i32) {
        let font_size = (self.font_size + steps as f32 * self.config.zoom_step).max(1.0);
        if font_size == self.font_size {
            return;
        }

        // Keep the same first line on screen across the change.
        let first = self.first_visible_block() as i32;
        self.font_size = font_size;
        self.line_height = self.config.line_height_for(font_size);
        self.scroll_y = (first * self.line_height).clamp(0, self.max_scroll());
        self.pending.push(SurfaceEvent::UpdateRequest {
            rect: self.viewport_rect(),
            dy: 0,
        });
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.pending)
    }

    fn insert_text(&mut self, text: &str) -> BufferResult<()> {
        if self.read_only || text.is_empty() {
            return Ok(());
        }
        if self.cursor.has_selection() {
            self.delete_selection()?;
        }

        let old_block_count = self.block_count();
        let first_line = self.cursor.position.line;
        let idx = self.caret_index();
        self.buffer.insert(idx, text)?;
        self.place_caret_at_index(idx + text.chars().count())?;
        self.text_changed(first_line, old_block_count);
        Ok(())
    }

    fn delete_backward(&mut self) -> BufferResult<()> {
        if self.read_only {
            return Ok(());
        }
        if self.cursor.has_selection() {
            return self.delete_selection();
        }

        let idx = self.caret_index();
        if idx == 0 {
            return Ok(());
        }
        let start = match self.buffer.slice(idx.saturating_sub(2)..idx) {
            Ok(tail) if idx >= 2 && tail == "\r\n" => idx - 2,
            _ => idx - 1,
        };

        let old_block_count = self.block_count();
        self.buffer.delete(start..idx)?;
        self.place_caret_at_index(start)?;
        let first_line = self.cursor.position.line;
        self.text_changed(first_line, old_block_count);
        Ok(())
    }

    fn delete_selection(&mut self) -> BufferResult<()> {
        if self.read_only {
            return Ok(());
        }
        let Some((start, end)) = self.cursor.selection_range() else {
            return Ok(());
        };

        let old_block_count = self.block_count();
        let start_idx = self.buffer.position_to_char_idx(start)?;
        let end_idx = self.buffer.position_to_char_idx(end)?;
        self.buffer.delete(start_idx..end_idx)?;
        self.buffer.seal_history();
        self.cursor.move_to(start);
        self.text_changed(start.line, old_block_count);
        Ok(())
    }

    fn selected_text(&self) -> Option<String> {
        let (start, end) = self.cursor.selection_range()?;
        let start_idx = self.buffer.position_to_char_idx(start).ok()?;
        let end_idx = self.buffer.position_to_char_idx(end).ok()?;
        self.buffer
            .slice(start_idx..end_idx)
            .ok()
            .map(|s| s.into_owned())
    }

    fn select_all(&mut self) {
        self.cursor.select_all(self.buffer.end_position());
        self.pending.push(SurfaceEvent::CursorPositionChanged);
    }

    fn undo(&mut self) -> BufferResult<()> {
        if self.read_only {
            return Ok(());
        }
        let old_block_count = self.block_count();
        let caret = self.buffer.undo()?;
        self.place_caret_at_index(caret)?;
        let first_line = self.first_visible_block();
        self.text_changed(first_line, old_block_count);
        Ok(())
    }

    fn redo(&mut self) -> BufferResult<()> {
        if self.read_only {
            return Ok(());
        }
        let old_block_count = self.block_count();
        let caret = self.buffer.redo()?;
        self.place_caret_at_index(caret)?;
        let first_line = self.first_visible_block();
        self.text_changed(first_line, old_block_count);
        Ok(())
    }
}

/// Replaces each tab with spaces up to the next multiple of `tab_size`.
pub fn expand_tabs(text: &str, tab_size: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }

    let tab_size = tab_size.max(1);
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        if ch == '\t' {
            let spaces = tab_size - column % tab_size;
            out.extend(std::iter::repeat_n(' ', spaces));
            column += spaces;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(lines: usize) -> EditorSurface {
        let config = EditorConfig {
            font_size: 10.0,
            line_height_factor: 1.0,
            viewport_width: 200,
            viewport_height: 50,
            ..EditorConfig::default()
        };
        let mut surface = EditorSurface::new(&config);
        let text: Vec<String> = (1..=lines).map(|i| format!("line {i}")).collect();
        surface.set_text(&text.join("\n"));
        surface.drain_events();
        surface
    }

    #[test]
    fn test_expand_tabs_to_next_stop() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("ab\tc", 4), "ab  c");
        assert_eq!(expand_tabs("abcd\te", 4), "abcd    e");
        assert_eq!(expand_tabs("a\tb", 2), "a b");
        assert_eq!(expand_tabs("plain", 4), "plain");
    }

    #[test]
    fn test_visible_lines_use_configured_tab_size() {
        let config = EditorConfig {
            tab_size: 8,
            ..EditorConfig::default()
        };
        let mut surface = EditorSurface::new(&config);
        surface.set_text("\tindented\r\nnext");

        assert_eq!(
            surface.visible_lines(),
            [(0, "        indented".to_string()), (1, "next".to_string())]
        );
        assert_eq!(surface.text(), "\tindented\r\nnext");
    }

    #[test]
    fn test_block_geometry_follows_scroll() {
        let mut s = surface(20);
        assert_eq!(s.line_height(), 10);
        assert_eq!(s.first_visible_block(), 0);

        s.scroll_by(25);
        assert_eq!(s.first_visible_block(), 2);
        assert_eq!(s.block_top(2), -5);
        assert_eq!(s.block_top(3), 5);
        assert_eq!(
            s.drain_events(),
            vec![SurfaceEvent::UpdateRequest {
                rect: s.viewport_rect(),
                dy: -25
            }]
        );
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut s = surface(8);
        s.scroll_by(1000);
        assert_eq!(s.scroll_offset(), 30);
        s.scroll_by(-1000);
        assert_eq!(s.scroll_offset(), 0);
        s.drain_events();

        s.scroll_by(-5);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_newline_reports_block_count() {
        let mut s = surface(2);
        s.move_caret(CaretMove::DocumentEnd);
        s.drain_events();

        s.insert_text("\n").unwrap();
        let events = s.drain_events();
        assert!(events.contains(&SurfaceEvent::BlockCountChanged(3)));
        assert!(events.contains(&SurfaceEvent::CursorPositionChanged));
        assert_eq!(s.caret_line(), 2);
    }

    #[test]
    fn test_edit_repaints_from_edited_line_down() {
        let mut s = surface(5);
        s.move_caret(CaretMove::Down(2));
        s.drain_events();

        s.insert_text("x").unwrap();
        let events = s.drain_events();
        assert!(events.contains(&SurfaceEvent::UpdateRequest {
            rect: Rect::new(0, 20, 200, 30),
            dy: 0
        }));
    }

    #[test]
    fn test_caret_stays_visible() {
        let mut s = surface(30);
        s.move_caret(CaretMove::Down(10));
        assert_eq!(s.caret_line(), 10);
        assert!(s.block_top(10) >= 0);
        assert!(s.block_top(10) + s.line_height() <= s.viewport_rect().height);
    }

    #[test]
    fn test_set_text_resets_caret_and_scroll() {
        let mut s = surface(30);
        s.scroll_by(100);
        s.move_caret(CaretMove::DocumentEnd);
        s.set_text("fresh");
        assert_eq!(s.scroll_offset(), 0);
        assert_eq!((s.caret_line(), s.caret_column()), (0, 0));
        assert!(!s.is_modified());
    }

    #[test]
    fn test_undo_redo_through_surface() {
        let mut s = surface(1);
        s.move_caret(CaretMove::LineEnd);
        s.insert_text("!").unwrap();
        assert_eq!(s.text(), "line 1!");

        s.undo().unwrap();
        assert_eq!(s.text(), "line 1");
        assert_eq!(s.caret_column(), 6);

        s.redo().unwrap();
        assert_eq!(s.text(), "line 1!");
    }

    #[test]
    fn test_backspace_removes_crlf_pair() {
        let mut s = surface(1);
        s.set_text("a\r\nb");
        s.set_caret(Position::new(1, 0));
        s.delete_backward().unwrap();
        assert_eq!(s.text(), "ab");
    }

    #[test]
    fn test_selection_replace() {
        let mut s = surface(2);
        s.select_all();
        assert_eq!(s.selected_text().as_deref(), Some("line 1\nline 2"));

        s.insert_text("gone").unwrap();
        assert_eq!(s.text(), "gone");
        assert_eq!(s.block_count(), 1);
    }

    #[test]
    fn test_zoom_changes_line_height() {
        let mut s = surface(3);
        s.zoom(1);
        assert_eq!(s.font_size(), 12.0);
        assert_eq!(s.line_height(), 12);
        s.zoom(-100);
        assert_eq!(s.font_size(), 1.0);
    }

    #[test]
    fn test_read_only_ignores_edits() {
        let mut s = surface(1);
        s.set_read_only(true);
        s.insert_text("nope").unwrap();
        assert_eq!(s.text(), "line 1");
    }
}
