use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default file name of the library store
pub const DEFAULT_LIBRARY_FILE: &str = "reader_library.json";

/// Saved reading location with a free-form note
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub position: usize,
    pub note: String,
    /// Unix seconds
    pub created_at: u64,
}

impl Bookmark {
    pub fn new(position: usize, note: impl Into<String>) -> Self {
        Self {
            position,
            note: note.into(),
            created_at: unix_now(),
        }
    }
}

/// Everything remembered about one book file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: u64,
    pub title: String,
    pub author: Option<String>,
    pub format: String,
    pub last_position: usize,
    pub date_added: u64,
    pub date_opened: Option<u64>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

/// Reading position and bookmark persistence, keyed by book file path
pub trait ReadingStore {
    /// Last saved position, if the book is known
    fn position(&self, book_key: &str) -> Option<usize>;
    /// Fails when the book was never registered
    fn set_position(&mut self, book_key: &str, position: usize) -> Result<()>;
    /// Fails when the book was never registered
    fn add_bookmark(&mut self, book_key: &str, bookmark: Bookmark) -> Result<()>;
    fn bookmarks(&self, book_key: &str) -> &[Bookmark];
}

/// JSON-file backed store of books, positions, bookmarks and settings
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Library {
    next_id: u64,
    books: BTreeMap<String, BookRecord>,
    settings: BTreeMap<String, String>,
    /// Unix seconds of the last mutation
    last_updated: u64,
}

impl Library {
    /// Load the library file, or start empty when it does not exist yet
    pub async fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let library: Self = serde_json::from_str(&content)
                    .with_context(|| format!("Corrupt library file {}", path.display()))?;
                info!("Loaded library {}: {} books", path.display(), library.books.len());
                Ok(library)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No library at {}, starting empty", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read library file {}", path.display())),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write library file {}", path.display()))?;
        debug!("Saved library {}", path.display());
        Ok(())
    }

    /// Register a book on first open, or stamp the open time of a known one; returns its saved position
    pub fn open_book(&mut self, book_key: &str, title: &str, author: Option<&str>, format: &str) -> usize {
        let now = unix_now();
        self.last_updated = now;

        if let Some(record) = self.books.get_mut(book_key) {
            record.date_opened = Some(now);
            info!(book = book_key, position = record.last_position, "Reopened book");
            return record.last_position;
        }

        self.next_id += 1;
        self.books.insert(
            book_key.to_string(),
            BookRecord {
                id: self.next_id,
                title: title.to_string(),
                author: author.map(str::to_string),
                format: format.to_string(),
                last_position: 0,
                date_added: now,
                date_opened: Some(now),
                bookmarks: Vec::new(),
            },
        );
        info!(book = book_key, id = self.next_id, "Added book to library");
        0
    }

    pub fn book(&self, book_key: &str) -> Option<&BookRecord> {
        self.books.get(book_key)
    }

    pub fn books(&self) -> impl Iterator<Item = (&String, &BookRecord)> {
        self.books.iter()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn set_setting(&mut self, key: &str, value: impl Into<String>) {
        self.settings.insert(key.to_string(), value.into());
        self.last_updated = unix_now();
    }

    /// Default library location: next to the working directory
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_LIBRARY_FILE)
    }

    fn record_mut(&mut self, book_key: &str) -> Result<&mut BookRecord> {
        self.books
            .get_mut(book_key)
            .with_context(|| format!("Book is not in the library: {book_key}"))
    }
}

impl ReadingStore for Library {
    fn position(&self, book_key: &str) -> Option<usize> {
        self.books.get(book_key).map(|record| record.last_position)
    }

    fn set_position(&mut self, book_key: &str, position: usize) -> Result<()> {
        self.record_mut(book_key)?.last_position = position;
        self.last_updated = unix_now();
        Ok(())
    }

    fn add_bookmark(&mut self, book_key: &str, bookmark: Bookmark) -> Result<()> {
        self.record_mut(book_key)?.bookmarks.push(bookmark);
        self.last_updated = unix_now();
        Ok(())
    }

    fn bookmarks(&self, book_key: &str) -> &[Bookmark] {
        self.books
            .get(book_key)
            .map(|record| record.bookmarks.as_slice())
            .unwrap_or_default()
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
