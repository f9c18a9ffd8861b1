pub mod chapters;
pub mod error;
pub mod library;
pub mod loader;
pub mod locator;
pub mod paginator;
pub mod session;
pub mod text;

// Re-export main types for convenient access
pub use chapters::{ChapterIndex, ChapterMark, HeadingPatterns};
pub use error::{PaginationError, PaginationResult};
pub use locator::{current_page, total_pages, PageLocator};
pub use paginator::{Page, PaginationConfig, Paginator};
pub use text::BookText;

// Re-export collaborators around the pagination core
pub use library::{Bookmark, Library, ReadingStore};
pub use loader::{LoadedText, LoaderConfig, TextLoader};
pub use session::BookSession;
