// WHY: pagination failures are local computation errors, distinct from the anyhow-wrapped I/O errors
// of the loader and library layers

use thiserror::Error;

/// Result type for the pagination core
pub type PaginationResult<T> = Result<T, PaginationError>;

/// Errors raised by chapter detection, page slicing and page-number reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page size must be a positive number of characters
    #[error("invalid page size {0}: must be at least 1 character")]
    InvalidPageSize(usize),

    /// A non-last page failed to move past its start offset
    #[error("pagination did not advance: page starting at {start} ended at {next}")]
    NonAdvancingPagination { start: usize, next: usize },

    /// Offset lies outside `[0, length]`
    #[error("offset {offset} is outside the text (length {length})")]
    OffsetOutOfRange { offset: usize, length: usize },

    /// Heading pattern failed to compile
    #[error("invalid chapter heading pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
