// WHY: chapter starts are hard page breaks, so they are indexed once per loaded text
// and queried by the paginator on every page

use regex_automata::meta::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PaginationError, PaginationResult};
use crate::text::BookText;

/// Heading patterns in priority order; tested against the trimmed line
///
/// Bare numbers ("3.") and Roman numerals ("IV.") also match numbered list items.
/// This is a known false positive of the heuristic.
pub const DEFAULT_HEADING_PATTERNS: &[&str] = &[
    r"^Розділ \d+",
    r"^Глава \d+",
    r"^РОЗДІЛ \d+",
    r"^ГЛАВА \d+",
    r"^Chapter \d+",
    r"^CHAPTER \d+",
    r"^\d+\.",
    r"^[IVX]+\.",
];

/// A detected heading and its trimmed text
///
/// `offset` is the length of the newline-joined prefix of the preceding lines: 0 for the
/// first line, otherwise the position of the newline that ends the previous line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterMark {
    pub offset: usize,
    pub title: String,
}

/// Compiled heading patterns, checked first-match-wins
#[derive(Debug, Clone)]
pub struct HeadingPatterns {
    patterns: Vec<Regex>,
}

impl HeadingPatterns {
    pub fn new(sources: &[&str]) -> PaginationResult<Self> {
        let patterns = sources
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|e| PaginationError::InvalidPattern {
                    pattern: (*source).to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<PaginationResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn with_defaults() -> PaginationResult<Self> {
        Self::new(DEFAULT_HEADING_PATTERNS)
    }

    /// Index of the first pattern matching `line`, if any
    pub fn first_match(&self, line: &str) -> Option<usize> {
        self.patterns.iter().position(|pattern| pattern.is_match(line))
    }
}

/// Ordered chapter-start offsets for one text
#[derive(Debug, Clone, Default)]
pub struct ChapterIndex {
    marks: Vec<ChapterMark>,
}

impl ChapterIndex {
    /// Scan `text` with the default heading patterns
    pub fn build(text: &BookText) -> PaginationResult<Self> {
        let patterns = HeadingPatterns::with_defaults()?;
        Ok(Self::build_with(text, &patterns))
    }

    /// Scan `text` line by line, recording a mark for every heading line
    pub fn build_with(text: &BookText, patterns: &HeadingPatterns) -> Self {
        let mut marks = Vec::new();
        let mut line_start = 0usize;

        if !text.is_empty() {
            for line in text.as_str().split('\n') {
                let trimmed = line.trim();
                if let Some(pattern_index) = patterns.first_match(trimmed) {
                    // Joined prefix length: the newline before the heading, or 0 on the first line
                    let offset = line_start.saturating_sub(1);
                    debug!(offset, pattern_index, title = trimmed, "Detected chapter heading");
                    marks.push(ChapterMark {
                        offset,
                        title: trimmed.to_string(),
                    });
                }
                // +1 for the newline consumed by split
                line_start += line.chars().count() + 1;
            }
        }

        info!("Chapter index built: {} marks over {} characters", marks.len(), text.len());
        Self { marks }
    }

    pub fn marks(&self) -> &[ChapterMark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Smallest mark offset strictly greater than `offset`
    pub fn next_mark_after(&self, offset: usize) -> Option<usize> {
        let index = self.marks.partition_point(|mark| mark.offset <= offset);
        self.marks.get(index).map(|mark| mark.offset)
    }

    /// Largest mark offset strictly less than `offset`
    pub fn prev_mark_before(&self, offset: usize) -> Option<usize> {
        let index = self.marks.partition_point(|mark| mark.offset < offset);
        index.checked_sub(1).map(|i| self.marks[i].offset)
    }

    /// Whether a mark lies less than `tolerance` characters away from `offset`
    pub fn is_near_mark_boundary(&self, offset: usize, tolerance: usize) -> bool {
        self.marks
            .iter()
            .any(|mark| mark.offset.abs_diff(offset) < tolerance)
    }

    /// The chapter containing `offset`: the last mark at or before it
    pub fn chapter_at(&self, offset: usize) -> Option<&ChapterMark> {
        let index = self.marks.partition_point(|mark| mark.offset <= offset);
        index.checked_sub(1).and_then(|i| self.marks.get(i))
    }
}
