//! Core text buffer implementation using a rope.
//!
//! Snippets are small, but the editor re-reads the text on every
//! keystroke and splices on every accepted suggestion. The rope keeps
//! both cheap and gives line/column conversion for free.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use unicode_width::UnicodeWidthStr;

use crate::{BufferError, BufferResult, Position};

/// A text buffer backed by a rope data structure.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,

    /// Whether the buffer changed since the last `mark_clean`
    modified: bool,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use cml_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole content, e.g. when the host pushes a new value.
    pub fn set_text(&mut self, text: &str) {
        if self.rope != text {
            self.rope = Rope::from_str(text);
            self.modified = true;
        }
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).into())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        self.rope.insert(char_idx, text);
        self.modified = true;
        Ok(())
    }

    /// Deletes text in a character range, returning what was removed.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        self.check_range(&range)?;
        let deleted: String = self.rope.slice(range.clone()).into();
        self.rope.remove(range);
        self.modified = true;
        Ok(deleted)
    }

    /// Replaces text in a range with new text.
    ///
    /// The range is validated before anything is removed, so a failed
    /// splice leaves the buffer untouched.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<String> {
        self.check_range(&range)?;
        let start = range.start;
        let deleted = self.delete(range)?;
        self.insert(start, text)?;
        Ok(deleted)
    }

    // ==================== Position Conversion ====================

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        Ok(Position::new(line, char_idx - line_start))
    }

    /// Returns the rendered width of the text between the start of the
    /// caret's line and the caret, in monospace cells.
    ///
    /// Wide glyphs count as two cells, which keeps popup anchoring sane
    /// for CJK labels in a fixed-width editor.
    pub fn display_column(&self, char_idx: usize) -> BufferResult<usize> {
        let pos = self.char_idx_to_position(char_idx)?;
        let line_start = self.rope.line_to_char(pos.line);
        let prefix: String = self.rope.slice(line_start..char_idx).into();
        Ok(prefix.width())
    }

    // ==================== State Queries ====================

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_clean(&mut self) {
        self.modified = false;
    }

    fn check_range(&self, range: &Range<usize>) -> BufferResult<()> {
        if range.start > range.end {
            return Err(BufferError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(())
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            modified: false,
        }
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
    fn test_position_conversion() {
        let buffer = TextBuffer::from("rule\nrequire(a)\n");
        assert_eq!(buffer.char_idx_to_position(0).unwrap(), Position::new(0, 0));
        assert_eq!(buffer.char_idx_to_position(7).unwrap(), Position::new(1, 2));
        assert_eq!(buffer.char_idx_to_position(16).unwrap(), Position::new(2, 0));
        assert!(buffer.char_idx_to_position(17).is_err());
    }

    #[test]
    fn test_display_column_counts_wide_glyphs() {
        let buffer = TextBuffer::from("a\n製品x");
        assert_eq!(buffer.display_column(5).unwrap(), 5);
        assert_eq!(buffer.display_column(2).unwrap(), 0);
    }

    #[test]
    fn test_set_text_tracks_modification() {
        let mut buffer = TextBuffer::from("abc");
        assert!(!buffer.is_modified());
        buffer.set_text("abc");
        assert!(!buffer.is_modified());
        buffer.set_text("abd");
        assert!(buffer.is_modified());
        buffer.mark_clean();
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_multibyte_splice() {
        let mut buffer = TextBuffer::from("größe = x");
        buffer.replace(8..9, "größe").unwrap();
        assert_eq!(buffer.text(), "größe = größe");
        assert_eq!(buffer.slice(0..5).unwrap(), "größe");
    }
}
