// WHY: one open book owns its position cursor and page cache; the text, chapter index
// and paginator are immutable once the book is opened

use std::sync::Arc;
use tracing::{debug, info};

use crate::chapters::{ChapterIndex, ChapterMark};
use crate::error::{PaginationError, PaginationResult};
use crate::library::{Bookmark, ReadingStore};
use crate::loader::LoadedText;
use crate::locator::PageLocator;
use crate::paginator::{Page, PaginationConfig, Paginator};
use crate::text::BookText;

/// Reading state of one open book
#[derive(Debug)]
pub struct BookSession {
    book_key: String,
    title: String,
    author: Option<String>,
    paginator: Paginator,
    position: usize,
    locator: PageLocator,
}

impl BookSession {
    /// Open a loaded book at its saved position with default pagination settings
    pub fn open(book_key: impl Into<String>, loaded: LoadedText, saved_position: usize) -> PaginationResult<Self> {
        Self::open_with_config(book_key, loaded, saved_position, PaginationConfig::default())
    }

    /// Build the chapter index and paginator; a saved position past the end is clamped to it
    pub fn open_with_config(
        book_key: impl Into<String>,
        loaded: LoadedText,
        saved_position: usize,
        config: PaginationConfig,
    ) -> PaginationResult<Self> {
        let text = Arc::new(BookText::new(loaded.content));
        let chapters = Arc::new(ChapterIndex::build(&text)?);
        let position = saved_position.min(text.len());
        let book_key = book_key.into();

        info!(
            book = %book_key,
            chars = text.len(),
            chapters = chapters.len(),
            position,
            "Opened book session"
        );

        Ok(Self {
            book_key,
            title: loaded.title,
            author: loaded.author,
            paginator: Paginator::with_config(text, chapters, config),
            position,
            locator: PageLocator::new(),
        })
    }

    pub fn book_key(&self) -> &str {
        &self.book_key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn chapters(&self) -> &[ChapterMark] {
        self.paginator.chapters().marks()
    }

    pub fn locator(&self) -> &PageLocator {
        &self.locator
    }

    /// Move the cursor to `offset`
    pub fn set_position(&mut self, offset: usize) -> PaginationResult<()> {
        let length = self.paginator.len();
        if offset > length {
            return Err(PaginationError::OffsetOutOfRange { offset, length });
        }
        self.position = offset;
        Ok(())
    }

    /// Page shown at the current position
    pub fn current_page(&self, page_size: usize) -> PaginationResult<Page<'_>> {
        self.paginator.get_page(self.position, page_size)
    }

    /// Advance one page unless already on the last one; returns the page now shown
    pub fn next_page(&mut self, page_size: usize) -> PaginationResult<Page<'_>> {
        let page = self.paginator.get_page(self.position, page_size)?;
        if !page.is_last {
            debug!(from = self.position, to = page.next_offset, "Next page");
            self.position = page.next_offset;
        }
        self.current_page(page_size)
    }

    /// Go back to the start of the previous page
    ///
    /// A position inside a page (after a page-size change or a bookmark jump) first
    /// snaps back to the start of the page containing it.
    pub fn prev_page(&mut self, page_size: usize) -> PaginationResult<Page<'_>> {
        let current = self.locator.current_page(&self.paginator, self.position, page_size)?;
        let current_start = self.locator.page_start(&self.paginator, current, page_size)?;
        let target = if current_start < self.position {
            current_start
        } else {
            self.locator.page_start(&self.paginator, current.saturating_sub(1), page_size)?
        };

        debug!(from = self.position, to = target, "Previous page");
        self.position = target;
        self.current_page(page_size)
    }

    /// Jump to the start of 1-based page `page_number`, clamped to the book
    pub fn go_to_page(&mut self, page_number: usize, page_size: usize) -> PaginationResult<Page<'_>> {
        self.position = self.locator.page_start(&self.paginator, page_number, page_size)?;
        self.current_page(page_size)
    }

    /// `(current, total)` page numbers; the total is memoized per page size
    pub fn page_number(&mut self, page_size: usize) -> PaginationResult<(usize, usize)> {
        let current = self.locator.current_page(&self.paginator, self.position, page_size)?;
        let total = self.locator.total_pages(&self.paginator, page_size)?;
        Ok((current, total))
    }

    /// Chapter the cursor is in
    pub fn current_chapter(&self) -> Option<&ChapterMark> {
        self.paginator.chapters().chapter_at(self.position)
    }

    /// Whether the cursor sits near a chapter heading
    pub fn at_chapter_start(&self) -> bool {
        let tolerance = self.paginator.config().chapter_tolerance;
        self.paginator.chapters().is_near_mark_boundary(self.position, tolerance)
    }

    /// Move to the next chapter heading, if there is one
    pub fn next_chapter(&mut self) -> Option<usize> {
        let target = self.paginator.chapters().next_mark_after(self.position)?;
        self.position = target;
        Some(target)
    }

    /// Move to the start of the current chapter, or the previous one when already at its heading
    pub fn prev_chapter(&mut self) -> Option<usize> {
        let target = self.paginator.chapters().prev_mark_before(self.position)?;
        self.position = target;
        Some(target)
    }

    /// Record the current position in the store
    pub fn save_position(&self, store: &mut dyn ReadingStore) -> anyhow::Result<()> {
        store.set_position(&self.book_key, self.position)
    }

    /// Bookmark the current position
    pub fn add_bookmark(&self, store: &mut dyn ReadingStore, note: &str) -> anyhow::Result<Bookmark> {
        let bookmark = Bookmark::new(self.position, note);
        store.add_bookmark(&self.book_key, bookmark.clone())?;
        info!(book = %self.book_key, position = self.position, "Added bookmark");
        Ok(bookmark)
    }

    pub fn go_to_bookmark(&mut self, bookmark: &Bookmark) -> PaginationResult<()> {
        self.set_position(bookmark.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Library;
    use crate::loader::TextEncoding;

    fn loaded(content: &str) -> LoadedText {
        LoadedText {
            content: content.to_string(),
            title: "Test".to_string(),
            author: None,
            encoding: TextEncoding::Utf8,
        }
    }

    fn book() -> String {
        let mut content = String::new();
        for chapter in 1..=3 {
            content.push_str(&format!("Chapter {chapter}\n"));
            content.push_str(&"Lorem ipsum dolor sit amet. ".repeat(20));
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_saved_position_is_clamped() {
        let session = BookSession::open("a.txt", loaded("short"), 1000).unwrap();
        assert_eq!(session.position(), 5);
    }

    #[test]
    fn test_next_then_prev_returns_to_start() {
        let mut session = BookSession::open("a.txt", loaded(&book()), 0).unwrap();
        let first = session.current_page(100).unwrap().text.to_string();

        session.next_page(100).unwrap();
        assert!(session.position() > 0);
        assert_eq!(session.page_number(100).unwrap().0, 2);

        let back = session.prev_page(100).unwrap();
        assert_eq!(back.text, first);
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn test_next_page_stops_on_last_page() {
        let mut session = BookSession::open("a.txt", loaded(&book()), 0).unwrap();
        let (_, total) = session.page_number(100).unwrap();

        for _ in 0..total + 5 {
            session.next_page(100).unwrap();
        }
        let (current, _) = session.page_number(100).unwrap();
        assert_eq!(current, total);
        assert!(session.current_page(100).unwrap().is_last);
    }

    #[test]
    fn test_prev_page_from_middle_snaps_to_page_start() {
        let mut session = BookSession::open("a.txt", loaded(&book()), 0).unwrap();
        session.go_to_page(3, 100).unwrap();
        let third_start = session.position();
        session.set_position(third_start + 5).unwrap();

        session.prev_page(100).unwrap();
        assert_eq!(session.position(), third_start);
    }

    #[test]
    fn test_chapter_navigation() {
        let mut session = BookSession::open("a.txt", loaded(&book()), 0).unwrap();
        assert_eq!(session.chapters().len(), 3);
        assert!(session.at_chapter_start());
        assert_eq!(session.current_chapter().unwrap().title, "Chapter 1");

        let second = session.next_chapter().unwrap();
        assert_eq!(session.current_chapter().unwrap().title, "Chapter 2");
        assert!(session.current_page(10_000).unwrap().text.starts_with("\nChapter 2"));

        session.next_chapter().unwrap();
        assert_eq!(session.next_chapter(), None);

        assert_eq!(session.prev_chapter(), Some(second));
        assert_eq!(session.prev_chapter(), Some(0));
        assert_eq!(session.prev_chapter(), None);
    }

    #[test]
    fn test_set_position_out_of_range() {
        let mut session = BookSession::open("a.txt", loaded("abc"), 0).unwrap();
        assert_eq!(
            session.set_position(4),
            Err(PaginationError::OffsetOutOfRange { offset: 4, length: 3 })
        );
        assert!(session.set_position(3).is_ok());
    }

    #[test]
    fn test_position_and_bookmarks_persist_through_store() {
        let mut library = Library::default();
        library.open_book("a.txt", "Test", None, "txt");

        let mut session = BookSession::open("a.txt", loaded(&book()), 0).unwrap();
        session.next_page(100).unwrap();
        session.save_position(&mut library).unwrap();
        let bookmark = session.add_bookmark(&mut library, "here").unwrap();

        assert_eq!(library.position("a.txt"), Some(session.position()));
        assert_eq!(library.bookmarks("a.txt"), &[bookmark.clone()]);

        session.go_to_page(1, 100).unwrap();
        session.go_to_bookmark(&bookmark).unwrap();
        assert_eq!(session.position(), bookmark.position);
    }

    #[test]
    fn test_store_errors_for_unregistered_book() {
        let mut library = Library::default();
        let session = BookSession::open("unregistered.txt", loaded(&book()), 0).unwrap();

        assert!(session.save_position(&mut library).is_err());
        assert!(session.add_bookmark(&mut library, "lost").is_err());
        assert!(library.bookmarks("unregistered.txt").is_empty());
    }

    #[test]
    fn test_page_size_change_invalidates_total() {
        let mut session = BookSession::open("a.txt", loaded(&book()), 0).unwrap();
        let (_, small_total) = session.page_number(50).unwrap();
        let generation = session.locator().generation();
        let (_, large_total) = session.page_number(500).unwrap();

        assert!(session.locator().generation() > generation);
        assert!(large_total <= small_total);
    }
}
