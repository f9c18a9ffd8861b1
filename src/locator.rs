// WHY: page boundaries depend on text content, so page numbers can only be
// reconstructed by replaying pagination from offset 0

use tracing::debug;

use crate::error::{PaginationError, PaginationResult};
use crate::paginator::Paginator;

fn check_position(paginator: &Paginator, position: usize) -> PaginationResult<()> {
    let length = paginator.len();
    if position > length {
        return Err(PaginationError::OffsetOutOfRange { offset: position, length });
    }
    Ok(())
}

/// 1-based number of the page containing `position`, replayed from offset 0
///
/// # Errors
/// `OffsetOutOfRange` when `position` lies past the end of the text,
/// `NonAdvancingPagination` when a page fails to move forward.
pub fn current_page(paginator: &Paginator, position: usize, page_size: usize) -> PaginationResult<usize> {
    if page_size == 0 {
        return Err(PaginationError::InvalidPageSize(page_size));
    }
    check_position(paginator, position)?;
    if position == 0 {
        return Ok(1);
    }

    let mut pos = 0;
    let mut page_num = 1;
    loop {
        let page = paginator.get_page(pos, page_size)?;
        if page.is_last || page.next_offset > position {
            break;
        }
        if page.next_offset <= pos {
            return Err(PaginationError::NonAdvancingPagination {
                start: pos,
                next: page.next_offset,
            });
        }
        pos = page.next_offset;
        page_num += 1;
    }

    Ok(page_num)
}

/// Number of pages in the book, counting every `get_page` call up to and including the last page
pub fn total_pages(paginator: &Paginator, page_size: usize) -> PaginationResult<usize> {
    Ok(page_starts(paginator, page_size)?.len())
}

/// Start offset of every page, in order; always holds at least one entry
pub fn page_starts(paginator: &Paginator, page_size: usize) -> PaginationResult<Vec<usize>> {
    let mut starts = Vec::new();
    for page in paginator.pages_from(0, page_size) {
        let page = page?;
        if let Some(&previous) = starts.last() {
            if page.start_offset <= previous {
                return Err(PaginationError::NonAdvancingPagination {
                    start: previous,
                    next: page.start_offset,
                });
            }
        }
        starts.push(page.start_offset);
    }
    Ok(starts)
}

/// Page-boundary cache for one open book
///
/// Holds the page-start table for a single page size. Changing the page size bumps
/// the generation and drops the table; it is rebuilt lazily on the next query.
#[derive(Debug, Default)]
pub struct PageLocator {
    page_size: Option<usize>,
    generation: u64,
    starts: Option<Vec<usize>>,
}

impl PageLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremented every time the cached page size changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cached_page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn is_cached(&self) -> bool {
        self.starts.is_some()
    }

    /// Drop cached boundaries if `page_size` differs from the cached one
    pub fn set_page_size(&mut self, page_size: usize) {
        if self.page_size != Some(page_size) {
            if self.page_size.is_some() {
                debug!(old = ?self.page_size, new = page_size, "Page size changed, invalidating page cache");
            }
            self.page_size = Some(page_size);
            self.generation += 1;
            self.starts = None;
        }
    }

    /// Forget everything, e.g. when a different text is loaded
    pub fn clear(&mut self) {
        self.page_size = None;
        self.generation += 1;
        self.starts = None;
    }

    fn starts(&mut self, paginator: &Paginator, page_size: usize) -> PaginationResult<&[usize]> {
        if page_size == 0 {
            return Err(PaginationError::InvalidPageSize(page_size));
        }
        self.set_page_size(page_size);

        let starts = match self.starts.take() {
            Some(starts) => starts,
            None => {
                let starts = page_starts(paginator, page_size)?;
                debug!(page_size, pages = starts.len(), generation = self.generation, "Computed page boundaries");
                starts
            }
        };

        Ok(self.starts.insert(starts).as_slice())
    }

    /// Memoized total page count for `page_size`
    pub fn total_pages(&mut self, paginator: &Paginator, page_size: usize) -> PaginationResult<usize> {
        Ok(self.starts(paginator, page_size)?.len())
    }

    /// 1-based page containing `position`
    pub fn current_page(&mut self, paginator: &Paginator, position: usize, page_size: usize) -> PaginationResult<usize> {
        check_position(paginator, position)?;
        let starts = self.starts(paginator, page_size)?;
        Ok(starts.partition_point(|&start| start <= position).max(1))
    }

    /// Start offset of 1-based page `page_number`, clamped to the last page
    pub fn page_start(&mut self, paginator: &Paginator, page_number: usize, page_size: usize) -> PaginationResult<usize> {
        let starts = self.starts(paginator, page_size)?;
        let index = page_number.clamp(1, starts.len().max(1)) - 1;
        Ok(starts.get(index).copied().unwrap_or(0))
    }
}
