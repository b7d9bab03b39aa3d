//! # Pocketcode Buffer
//!
//! The editable content behind one open file.
//!
//! An [`EditSession`] owns a rope, a directed selection and a syntax-mode tag.
//! The session manager hands exactly one of these to the editor view at a
//! time; the selection overlay reads and moves its selection.
//!
//! ## Coordinates
//!
//! Positions are `(row, column)` pairs, both 0-indexed, with columns counted
//! in characters rather than bytes.

mod position;
mod selection;
mod session;
mod word;

pub use position::Position;
pub use selection::{Range, Selection};
pub use session::EditSession;
pub use word::word_range;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {row}:{column} is out of bounds")]
    PositionOutOfBounds { row: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = EditSession::new("");
        assert!(session.is_empty());
        assert_eq!(session.len_lines(), 1);
        assert_eq!(session.cursor(), Position::ZERO);
    }

    #[test]
    fn test_session_from_text() {
        let session = EditSession::new("Hello, World!");
        assert_eq!(session.len_chars(), 13);
        assert_eq!(session.text(), "Hello, World!");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut session = EditSession::new("");
        session.insert(Position::ZERO, "Hello").unwrap();
        session.insert(Position::new(0, 5), ", World!").unwrap();
        assert_eq!(session.text(), "Hello, World!");

        let removed = session
            .remove(Range::new(Position::new(0, 5), Position::new(0, 7)))
            .unwrap();
        assert_eq!(removed, ", ");
        assert_eq!(session.text(), "HelloWorld!");
    }
}
