//! Logical line index.
//!
//! Wraps a [`Rope`] so documents get O(log N) line/offset conversion. All offsets are counted
//! in Unicode scalar values (`char`), the same unit [`crate::Position::column`] uses.

use ropey::Rope;

/// Logical line index - implemented using Rope data structure
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty line index (a single empty line).
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Get line number and offset within line from character offset.
    ///
    /// Offsets past the end of the document are clamped to the document end.
    pub fn char_offset_to_position(&self, char_offset: usize) -> (usize, usize) {
        let char_offset = char_offset.min(self.rope.len_chars());

        let line_idx = self.rope.char_to_line(char_offset);
        let line_start_char = self.rope.line_to_char(line_idx);
        let char_in_line = char_offset - line_start_char;

        (line_idx, char_in_line)
    }

    /// Get character offset from line number and column number.
    ///
    /// Lines past the end map to the document end; columns past the end of a line are clamped
    /// to the line's content (the newline is never addressed).
    pub fn position_to_char_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }

        let line_start_char = self.rope.line_to_char(line);
        line_start_char + column.min(self.line_len_chars(line))
    }

    /// Character length of a line, excluding its line terminator (`\n` or `\r\n`).
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }

        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    /// Get total line count
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get complete text
    pub fn get_text(&self) -> String {
        self.rope.to_string()
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_index() {
        let index = LineIndex::new();
        assert_eq!(index.line_count(), 1); // Rope empty document has 1 line
        assert_eq!(index.get_text(), "");
    }

    #[test]
    fn test_char_offset_to_position() {
        let index = LineIndex::from_text("ABC\nDEF\nGHI");

        assert_eq!(index.char_offset_to_position(0), (0, 0)); // A
        assert_eq!(index.char_offset_to_position(2), (0, 2)); // C
        assert_eq!(index.char_offset_to_position(4), (1, 0)); // D
        assert_eq!(index.char_offset_to_position(8), (2, 0)); // G
        assert_eq!(index.char_offset_to_position(99), (2, 3));
    }

    #[test]
    fn test_position_to_char_offset() {
        let index = LineIndex::from_text("ABC\nDEF\nGHI");

        assert_eq!(index.position_to_char_offset(0, 0), 0); // A
        assert_eq!(index.position_to_char_offset(0, 2), 2); // C
        assert_eq!(index.position_to_char_offset(1, 0), 4); // D
        assert_eq!(index.position_to_char_offset(2, 0), 8); // G
        assert_eq!(index.position_to_char_offset(0, 40), 3);
        assert_eq!(index.position_to_char_offset(7, 0), 11);
    }

    #[test]
    fn test_line_len_chars_strips_terminators() {
        let index = LineIndex::from_text("ab\r\ncd\nef");

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_len_chars(0), 2);
        assert_eq!(index.line_len_chars(1), 2);
        assert_eq!(index.line_len_chars(2), 2);
        assert_eq!(index.line_len_chars(3), 0);
    }

    #[test]
    fn test_only_line_feed_breaks_lines() {
        // lone CR, VT, FF, NEL, LS and PS stay inside their line
        let text = "a\rb\u{0B}c\u{0C}d\u{85}e\u{2028}f\u{2029}g\nnext";
        let index = LineIndex::from_text(text);

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_len_chars(0), 13);
        assert_eq!(index.char_offset_to_position(14), (1, 0));
    }

    #[test]
    fn test_utf8_cjk() {
        let text = "你好\n世界";
        let index = LineIndex::from_text(text);

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.char_offset_to_position(3), (1, 0));
        assert_eq!(index.position_to_char_offset(1, 2), 5);
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let index = LineIndex::from_text("a\nb\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_len_chars(2), 0);
    }
}
