//! Word boundaries for select-word.

use unicode_segmentation::UnicodeSegmentation;

/// Returns the `(start, end)` character columns of the word touching `column`.
///
/// A word is a run of alphanumerics or `_`. When the column sits right after
/// a word, that word is returned. Returns `None` when no word touches the
/// column.
pub fn word_range(line: &str, column: usize) -> Option<(usize, usize)> {
    let mut char_start = 0;
    let mut found = None;

    for segment in line.split_word_bounds() {
        let len = segment.chars().count();
        let char_end = char_start + len;

        if is_word(segment) && column >= char_start && column <= char_end {
            found = Some((char_start, char_end));
            // Prefer the word starting at the column over the one ending there.
            if column < char_end {
                break;
            }
        }

        if char_start > column {
            break;
        }
        char_start = char_end;
    }

    found
}

fn is_word(segment: &str) -> bool {
    segment.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !segment.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_inside() {
        assert_eq!(word_range("hello world", 7), Some((6, 11)));
    }

    #[test]
    fn test_word_at_end_of_word() {
        assert_eq!(word_range("hello world", 5), Some((0, 5)));
    }

    #[test]
    fn test_prefers_following_word() {
        assert_eq!(word_range("ab+cd", 3), Some((3, 5)));
    }

    #[test]
    fn test_no_word() {
        assert_eq!(word_range("  --  ", 3), None);
        assert_eq!(word_range("", 0), None);
    }

    #[test]
    fn test_underscore_identifier() {
        assert_eq!(word_range("let snake_case = 1;", 6), Some((4, 14)));
    }
}
