// CLI tests: run the built binary against temporary books and libraries

use std::path::Path;
use std::process::{Command, Output};

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

fn run_reader(fixture: &TestFixture, book: &Path, args: &[&str]) -> Output {
    let library = fixture.library_path();
    let mut command = Command::new(env!("CARGO_BIN_EXE_pagewise"));
    command
        .arg(book)
        .arg("--library")
        .arg(&library)
        .args(args);
    command.output().expect("Failed to run pagewise")
}

fn stdout_of(output: &Output) -> String {
    assert!(output.status.success(), "pagewise failed: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_show_prints_first_page() {
    let fixture = TestFixture::new();
    let book = fixture.create_book_file("voyage.txt", ENGLISH_BOOK);

    let stdout = stdout_of(&run_reader(&fixture, &book, &["--page-size", "80", "show"]));
    assert!(stdout.starts_with("The Voyage"));
    assert!(stdout.contains("A short preface"));
    assert!(stdout.contains("[page 1/"));
    assert!(fixture.read_library().is_ok(), "Library file should be written");
}

#[test]
fn test_next_is_persisted_between_runs() {
    let fixture = TestFixture::new();
    let book = fixture.create_book_file("voyage.txt", ENGLISH_BOOK);

    let stdout = stdout_of(&run_reader(&fixture, &book, &["--page-size", "80", "next"]));
    assert!(stdout.contains("[page 2/"));
    assert!(stdout.contains("Chapter 1"));

    // Page size is remembered in the library settings
    let stdout = stdout_of(&run_reader(&fixture, &book, &["status"]));
    assert!(stdout.contains("Page: 2/"));
    assert!(stdout.contains("(80 characters per page)"));
    assert!(stdout.contains("Chapter: Chapter 1"));

    let stdout = stdout_of(&run_reader(&fixture, &book, &["prev"]));
    assert!(stdout.contains("[page 1/"));
}

#[test]
fn test_chapters_and_bookmarks() {
    let fixture = TestFixture::new();
    let book = fixture.create_book_file("voyage.txt", ENGLISH_BOOK);

    let stdout = stdout_of(&run_reader(&fixture, &book, &["chapters"]));
    assert!(stdout.contains("1. Chapter 1"));
    assert!(stdout.contains("3. CHAPTER 3"));

    let stdout = stdout_of(&run_reader(&fixture, &book, &["chapter", "next"]));
    assert!(stdout.contains("Chapter 1"));

    stdout_of(&run_reader(&fixture, &book, &["bookmark", "--note", "departure"]));
    let stdout = stdout_of(&run_reader(&fixture, &book, &["bookmarks"]));
    assert!(stdout.contains("departure"));
}

#[test]
fn test_missing_book_fails() {
    let fixture = TestFixture::new();
    let output = run_reader(&fixture, &fixture.root_path.join("missing.txt"), &["show"]);
    assert!(!output.status.success());
}

#[test]
fn test_zero_page_size_rejected() {
    let fixture = TestFixture::new();
    let book = fixture.create_book_file("voyage.txt", ENGLISH_BOOK);
    let output = run_reader(&fixture, &book, &["--page-size", "0", "show"]);
    assert!(!output.status.success());
}
