//! Rope-backed edit sessions.
//!
//! ## Learning: Ownership
//!
//! The session manager owns every `EditSession`. The editor view only ever
//! borrows the active one, so there is no shared mutable text anywhere.

use ropey::Rope;
use std::borrow::Cow;

use crate::word::word_range;
use crate::{BufferError, BufferResult, Position, Range, Selection};

/// The editable content of one open file.
#[derive(Debug, Clone)]
pub struct EditSession {
    /// The rope holding our text content
    rope: Rope,

    /// Current selection (zero-width when only a cursor)
    selection: Selection,

    /// Syntax mode identifier, e.g. `"rust"` or `"text"`
    mode: String,

    /// Bumped on every content mutation
    revision: u64,
}

impl EditSession {
    /// Creates a session holding `text`, cursor at the start.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::default(),
            mode: "text".to_string(),
            revision: 0,
        }
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a row's text without its line break.
    pub fn line(&self, row: usize) -> BufferResult<Cow<'_, str>> {
        if row >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds { row, column: 0 });
        }
        let line: Cow<'_, str> = self.rope.line(row).into();
        Ok(match line {
            Cow::Borrowed(s) => Cow::Borrowed(trim_line_break(s)),
            Cow::Owned(s) => Cow::Owned(trim_line_break(&s).to_string()),
        })
    }

    /// Returns the selected text, or `None` for an empty selection.
    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection.range();
        if range.is_empty() {
            return None;
        }
        let start = self.position_to_char_idx(range.start).ok()?;
        let end = self.position_to_char_idx(range.end).ok()?;
        Some(self.rope.slice(start..end).to_string())
    }

    // ==================== Measurements ====================

    /// Returns true if the session holds no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of rows. An empty session has one row.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns a row's length in characters, excluding its line break.
    pub fn line_len(&self, row: usize) -> BufferResult<usize> {
        Ok(self.line(row)?.chars().count())
    }

    /// Returns the content revision. Any edit increments it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ==================== Position Conversion ====================

    /// Clamps a position onto the document.
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.len_lines().saturating_sub(1));
        let column = pos.column.min(self.line_len(row).unwrap_or(0));
        Position::new(row, column)
    }

    /// Converts a position to a character index.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        let line_len = self.line_len(pos.row).map_err(|_| BufferError::PositionOutOfBounds {
            row: pos.row,
            column: pos.column,
        })?;
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                row: pos.row,
                column: pos.column,
            });
        }
        Ok(self.rope.line_to_char(pos.row) + pos.column)
    }

    /// Converts a character index to a position.
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        let row = self.rope.char_to_line(char_idx);
        Ok(Position::new(row, char_idx - self.rope.line_to_char(row)))
    }

    // ==================== Mutations ====================

    /// Inserts text at a position. The selection is left where it was.
    pub fn insert(&mut self, pos: Position, text: &str) -> BufferResult<()> {
        let idx = self.position_to_char_idx(pos)?;
        self.rope.insert(idx, text);
        self.revision += 1;
        Ok(())
    }

    /// Removes a range and returns the removed text. Collapses the selection
    /// to the range start.
    pub fn remove(&mut self, range: Range) -> BufferResult<String> {
        let start = self.position_to_char_idx(range.start)?;
        let end = self.position_to_char_idx(range.end)?;
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.selection = Selection::cursor(range.start);
        self.revision += 1;
        Ok(removed)
    }

    /// Replaces the selection with `text` and places the cursor after it.
    pub fn replace_selection(&mut self, text: &str) -> BufferResult<()> {
        let range = self.selection.range();
        if !range.is_empty() {
            self.remove(range)?;
        }
        let idx = self.position_to_char_idx(range.start)?;
        self.rope.insert(idx, text);
        let cursor = self.char_idx_to_position(idx + text.chars().count())?;
        self.selection = Selection::cursor(cursor);
        self.revision += 1;
        Ok(())
    }

    /// Replaces the whole content, cursor back at the start.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.selection = Selection::default();
        self.revision += 1;
    }

    // ==================== Selection ====================

    /// Returns the current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Returns the cursor (the selection lead).
    pub fn cursor(&self) -> Position {
        self.selection.lead
    }

    /// Sets the selection, clamping both ends onto the document.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::new(self.clamp(selection.anchor), self.clamp(selection.lead));
    }

    /// Collapses the selection to a cursor at `pos`.
    pub fn move_cursor_to(&mut self, pos: Position) {
        self.selection = Selection::cursor(self.clamp(pos));
    }

    /// Moves the selection lead, keeping the anchor.
    pub fn select_to(&mut self, pos: Position) {
        self.selection.lead = self.clamp(pos);
    }

    /// Moves the selection anchor, keeping the lead.
    pub fn set_selection_anchor(&mut self, pos: Position) {
        self.selection.anchor = self.clamp(pos);
    }

    /// Selects the whole document.
    pub fn select_all(&mut self) {
        let last = self.len_lines().saturating_sub(1);
        let end = Position::new(last, self.line_len(last).unwrap_or(0));
        self.selection = Selection::new(Position::ZERO, end);
    }

    /// Extends the cursor to the word it touches.
    ///
    /// Returns false and leaves the selection alone when no word touches the
    /// cursor.
    pub fn select_word(&mut self) -> bool {
        let cursor = self.cursor();
        let Ok(line) = self.line(cursor.row) else {
            return false;
        };
        match word_range(&line, cursor.column) {
            Some((start, end)) => {
                self.selection = Selection::new(
                    Position::new(cursor.row, start),
                    Position::new(cursor.row, end),
                );
                true
            }
            None => false,
        }
    }

    // ==================== Mode ====================

    /// Returns the syntax mode identifier.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Sets the syntax mode identifier.
    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.mode = mode.into();
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for EditSession {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

fn trim_line_break(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}
