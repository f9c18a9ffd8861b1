use std::sync::Arc;

use serde::Serialize;

use crate::chapters::ChapterIndex;
use crate::error::{PaginationError, PaginationResult};
use crate::text::BookText;

/// Tuning knobs for page-end adjustment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Characters searched past the naive page end for a boundary
    pub lookahead: usize,
    /// Characters a page may end after
    pub boundary_chars: Vec<char>,
    /// Distance within which an offset counts as a chapter start
    pub chapter_tolerance: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            lookahead: 100,
            boundary_chars: vec![' ', '\n', '.', '!', '?'],
            chapter_tolerance: 50,
        }
    }
}

/// One screen of text borrowed from the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a> {
    pub text: &'a str,
    pub start_offset: usize,
    pub next_offset: usize,
    pub is_last: bool,
}

/// Slices a book into pages that end on a word or sentence boundary and never cross a chapter start
///
/// A pure function of `(text, chapters, config, start_offset, page_size)`.
#[derive(Debug, Clone)]
pub struct Paginator {
    text: Arc<BookText>,
    chapters: Arc<ChapterIndex>,
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(text: Arc<BookText>, chapters: Arc<ChapterIndex>) -> Self {
        Self::with_config(text, chapters, PaginationConfig::default())
    }

    pub fn with_config(text: Arc<BookText>, chapters: Arc<ChapterIndex>, config: PaginationConfig) -> Self {
        Self { text, chapters, config }
    }

    pub fn text(&self) -> &BookText {
        &self.text
    }

    pub fn chapters(&self) -> &ChapterIndex {
        &self.chapters
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Length of the book in characters
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Page starting at `start_offset` holding roughly `page_size` characters
    pub fn get_page(&self, start_offset: usize, page_size: usize) -> PaginationResult<Page<'_>> {
        if page_size == 0 {
            return Err(PaginationError::InvalidPageSize(page_size));
        }

        let length = self.text.len();
        if start_offset >= length {
            return Ok(Page {
                text: "",
                start_offset: length,
                next_offset: length,
                is_last: true,
            });
        }

        let naive_end = start_offset.saturating_add(page_size);
        let mut page_end = if naive_end >= length {
            length
        } else {
            self.boundary_end(start_offset, naive_end)?
        };

        // The tail page is clamped too; it stops being last when a chapter starts inside it
        if let Some(chapter_start) = self.chapters.next_mark_after(start_offset) {
            if chapter_start < page_end {
                page_end = chapter_start;
            }
        }

        if page_end <= start_offset {
            return Err(PaginationError::NonAdvancingPagination {
                start: start_offset,
                next: page_end,
            });
        }

        Ok(Page {
            text: self.text.slice(start_offset, page_end)?,
            start_offset,
            next_offset: page_end,
            is_last: page_end >= length,
        })
    }

    /// Offset just past the rightmost boundary char in the lookahead window, or a hard cut at `naive_end`
    fn boundary_end(&self, start_offset: usize, naive_end: usize) -> PaginationResult<usize> {
        let window_end = naive_end.saturating_add(self.config.lookahead).min(self.text.len());
        let window = self.text.slice(start_offset, window_end)?;

        let Some(byte_in_window) = window.rfind(|c: char| self.config.boundary_chars.contains(&c)) else {
            return Ok(naive_end);
        };

        let length = self.text.len();
        let window_start_byte = self
            .text
            .byte_offset(start_offset)
            .ok_or(PaginationError::OffsetOutOfRange { offset: start_offset, length })?;
        let boundary = self
            .text
            .char_offset(window_start_byte + byte_in_window)
            .ok_or(PaginationError::OffsetOutOfRange { offset: start_offset, length })?;

        Ok(boundary + 1)
    }

    /// Iterator over consecutive pages from `start_offset` to the end of the book
    pub fn pages_from(&self, start_offset: usize, page_size: usize) -> Pages<'_> {
        Pages {
            paginator: self,
            next_start: Some(start_offset),
            page_size,
        }
    }
}

/// Chains `next_offset` from page to page; yields the last page then stops
pub struct Pages<'a> {
    paginator: &'a Paginator,
    next_start: Option<usize>,
    page_size: usize,
}

impl<'a> Iterator for Pages<'a> {
    type Item = PaginationResult<Page<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.take()?;
        match self.paginator.get_page(start, self.page_size) {
            Ok(page) => {
                if !page.is_last {
                    self.next_start = Some(page.next_offset);
                }
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
