//! Document positions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position in an edit session (row and column).
///
/// Both row and column are 0-indexed. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Row number (0-indexed)
    pub row: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Position at the start of the document.
    pub const ZERO: Position = Position { row: 0, column: 0 };

    /// Creates a new position.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-indexed for user-facing output
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}
