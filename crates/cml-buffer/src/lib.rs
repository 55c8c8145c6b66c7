//! # CML Buffer
//!
//! Rope-backed text storage for the CML snippet editor.
//!
//! All offsets exposed by this crate are **character** offsets, matching
//! how the caret is reported by the host text area. Byte offsets never
//! leak out of the buffer.

mod buffer;
mod position;

pub use buffer::TextBuffer;
pub use position::Position;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("require(size)");
        assert_eq!(buffer.len_chars(), 13);
        assert_eq!(buffer.text(), "require(size)");
    }

    #[test]
    fn test_splice() {
        let mut buffer = TextBuffer::from("price = wi");
        let removed = buffer.replace(8..10, "width").unwrap();
        assert_eq!(removed, "wi");
        assert_eq!(buffer.text(), "price = width");
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut buffer = TextBuffer::from("abc");
        assert!(buffer.replace(2..9, "x").is_err());
        assert!(buffer.replace(2..1, "x").is_err());
        assert_eq!(buffer.text(), "abc");
    }
}
