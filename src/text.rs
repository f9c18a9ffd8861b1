// WHY: book offsets are character indices while Rust strings are indexed by byte,
// so the text keeps a char -> byte table and hands out borrowed slices

use crate::error::{PaginationError, PaginationResult};

/// Immutable book text addressed by 0-based character offsets
#[derive(Debug, Clone, Default)]
pub struct BookText {
    content: String,
    /// Byte offset of every character followed by `content.len()`; empty for pure ASCII text
    char_starts: Vec<usize>,
}

impl BookText {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let char_starts = if content.is_ascii() {
            Vec::new()
        } else {
            content
                .char_indices()
                .map(|(byte, _)| byte)
                .chain(std::iter::once(content.len()))
                .collect()
        };
        Self { content, char_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        if self.char_starts.is_empty() {
            self.content.len()
        } else {
            self.char_starts.len() - 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Byte position of a character offset; `len()` maps to the end of the string
    pub fn byte_offset(&self, char_offset: usize) -> Option<usize> {
        if self.char_starts.is_empty() {
            (char_offset <= self.content.len()).then_some(char_offset)
        } else {
            self.char_starts.get(char_offset).copied()
        }
    }

    /// Character offset of a byte position that sits on a char boundary
    pub fn char_offset(&self, byte_offset: usize) -> Option<usize> {
        if self.char_starts.is_empty() {
            (byte_offset <= self.content.len()).then_some(byte_offset)
        } else {
            self.char_starts.binary_search(&byte_offset).ok()
        }
    }

    /// Borrow the characters in `start..end`
    pub fn slice(&self, start: usize, end: usize) -> PaginationResult<&str> {
        let length = self.len();
        let out_of_range = |offset| PaginationError::OffsetOutOfRange { offset, length };

        let start_byte = self.byte_offset(start).ok_or_else(|| out_of_range(start))?;
        let end_byte = self.byte_offset(end).ok_or_else(|| out_of_range(end))?;
        if start_byte > end_byte {
            return Err(out_of_range(start));
        }

        Ok(&self.content[start_byte..end_byte])
    }
}

impl From<String> for BookText {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl From<&str> for BookText {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}
