//! Text selection handling.
//!
//! A [`Selection`] keeps its direction: the anchor stays where the selection
//! was started and the lead follows the cursor. Dragging the start handle of
//! the touch overlay moves the anchor; dragging the end handle moves the lead.
//!
//! ## Learning: Derived vs. Stored State
//!
//! The normalized [`Range`] is never stored. It is computed from anchor and
//! lead on demand, so the two can never disagree.

use crate::Position;
use serde::{Deserialize, Serialize};

/// A normalized span of text. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Range {
    /// Creates a new range, swapping the ends if needed.
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Returns true if the range covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if the range spans more than one row.
    pub fn is_multiline(&self) -> bool {
        self.start.row != self.end.row
    }

    /// Returns true if a position is within this range.
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }
}

/// A selection with direction information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started
    pub anchor: Position,
    /// Where the cursor is
    pub lead: Position,
}

impl Selection {
    /// Creates a directed selection.
    pub fn new(anchor: Position, lead: Position) -> Self {
        Self { anchor, lead }
    }

    /// Creates a zero-width selection (just a cursor).
    pub fn cursor(position: Position) -> Self {
        Self {
            anchor: position,
            lead: position,
        }
    }

    /// Returns the normalized range.
    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.lead)
    }

    /// Returns true if this is a zero-width selection.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.lead
    }

    /// Returns true if the lead sits before the anchor.
    pub fn is_backwards(&self) -> bool {
        self.lead < self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalization() {
        let range = Range::new(Position::new(2, 5), Position::new(1, 3));
        assert_eq!(range.start, Position::new(1, 3));
        assert_eq!(range.end, Position::new(2, 5));
        assert!(range.is_multiline());
    }

    #[test]
    fn test_range_contains_is_end_exclusive() {
        let range = Range::new(Position::new(1, 0), Position::new(1, 10));
        assert!(range.contains(Position::new(1, 5)));
        assert!(!range.contains(Position::new(1, 10)));
    }

    #[test]
    fn test_backwards_selection() {
        let sel = Selection::new(Position::new(0, 10), Position::new(0, 2));
        assert!(sel.is_backwards());
        assert_eq!(sel.range().start, Position::new(0, 2));
        assert!(!Selection::cursor(Position::ZERO).is_backwards());
    }
}
