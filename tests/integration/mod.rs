// Integration test utilities and common code
// WHY: book files and library paths are built the same way in every integration test

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use pagewise::{BookText, ChapterIndex, Paginator};

/// Temporary directory holding book files and a library file
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Write a book file with given content
    pub fn create_book_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        self.create_book_bytes(relative_path, content.as_bytes())
    }

    /// Write a book file from raw bytes, for non-UTF-8 encodings
    pub fn create_book_bytes<P: AsRef<Path>>(&self, relative_path: P, bytes: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, bytes).expect("Failed to write test book");
        file_path
    }

    pub fn library_path(&self) -> PathBuf {
        self.root_path.join("library.json")
    }

    pub fn read_library(&self) -> Result<String, std::io::Error> {
        fs::read_to_string(self.library_path())
    }
}

/// Paginator over `content` with default heading patterns and config
pub fn paginator_for(content: &str) -> Paginator {
    let text = Arc::new(BookText::new(content));
    let chapters = Arc::new(ChapterIndex::build(&text).expect("Default heading patterns should compile"));
    Paginator::new(text, chapters)
}
