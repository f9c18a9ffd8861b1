use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};

use pagewise::library::{Library, ReadingStore};
use pagewise::loader::{detect_format, LoaderConfig, TextLoader};
use pagewise::{BookSession, Page};

/// Fallback when neither a page size nor a viewport is given
const DEFAULT_PAGE_SIZE: usize = 2000;
/// Rows reserved for the header and status line
const RESERVED_LINES: usize = 5;
/// Columns reserved for margins
const RESERVED_COLS: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "pagewise")]
#[command(about = "Terminal reader for plain text books with chapter-aware pagination")]
#[command(version)]
struct Args {
    /// Book file (.txt)
    file: PathBuf,

    /// Library file holding positions, bookmarks and settings
    #[arg(long, default_value = pagewise::library::DEFAULT_LIBRARY_FILE)]
    library: PathBuf,

    /// Characters per page; remembered for later runs
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,

    /// Viewport width used to derive the page size
    #[arg(long, requires = "lines")]
    cols: Option<usize>,

    /// Viewport height used to derive the page size
    #[arg(long, requires = "cols")]
    lines: Option<usize>,

    /// Memory-map the book instead of buffered reads
    #[arg(long)]
    use_mmap: bool,

    /// Emit debug logs on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the page at the saved position
    Show,
    /// Turn to the next page
    Next,
    /// Turn to the previous page
    Prev,
    /// Jump to a page number
    Goto { page: usize },
    /// List detected chapters
    Chapters,
    /// Jump to the next or previous chapter
    Chapter {
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Bookmark the current position
    Bookmark {
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List bookmarks of this book
    Bookmarks,
    /// Print title, position and page numbers
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Next,
    Prev,
}

/// Characters that fit a viewport once header rows and margins are removed
fn viewport_page_size(cols: usize, lines: usize) -> usize {
    let usable = lines.saturating_sub(RESERVED_LINES) * cols.saturating_sub(RESERVED_COLS);
    if usable == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        usable
    }
}

fn resolve_page_size(args: &Args, library: &mut Library) -> usize {
    if let Some(size) = args.page_size {
        let size = usize::try_from(size).unwrap_or(DEFAULT_PAGE_SIZE);
        library.set_setting("page_size", size.to_string());
        return size;
    }
    if let (Some(cols), Some(lines)) = (args.cols, args.lines) {
        return viewport_page_size(cols, lines);
    }
    library
        .setting("page_size")
        .and_then(|value| value.parse().ok())
        .filter(|&size| size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

fn print_page(session: &BookSession, page: &Page<'_>, current: usize, total: usize) {
    match session.author() {
        Some(author) => println!("{} by {}", session.title(), author),
        None => println!("{}", session.title()),
    }
    println!();
    println!("{}", page.text);
    println!();

    let chapter = session.current_chapter().map(|mark| mark.title.as_str()).unwrap_or("");
    println!("[page {current}/{total}] {chapter}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .json()
        .init();

    info!(?args, "Parsed CLI arguments");

    if !args.file.is_file() {
        anyhow::bail!("Book file does not exist: {}", args.file.display());
    }

    let book_key = std::fs::canonicalize(&args.file)
        .unwrap_or_else(|_| args.file.clone())
        .display()
        .to_string();

    let loader = TextLoader::new(LoaderConfig {
        use_mmap: args.use_mmap,
        ..Default::default()
    });
    let (loaded, _stats) = loader.load(&args.file).await?;

    let mut library = Library::load(&args.library).await?;
    let page_size = resolve_page_size(&args, &mut library);
    let saved_position = library.open_book(
        &book_key,
        &loaded.title,
        loaded.author.as_deref(),
        &detect_format(&args.file),
    );

    let mut session = BookSession::open(book_key, loaded, saved_position).context("Failed to open book")?;

    let command = args.command.take().unwrap_or(Command::Show);
    let shows_page = matches!(
        command,
        Command::Show | Command::Next | Command::Prev | Command::Goto { .. } | Command::Chapter { .. }
    );

    match &command {
        Command::Show => {}
        Command::Next => {
            session.next_page(page_size)?;
        }
        Command::Prev => {
            session.prev_page(page_size)?;
        }
        Command::Goto { page } => {
            session.go_to_page(*page, page_size)?;
        }
        Command::Chapters => {
            for (number, mark) in session.chapters().iter().enumerate() {
                println!("{:>3}. {} (offset {})", number + 1, mark.title, mark.offset);
            }
            if session.chapters().is_empty() {
                println!("No chapters detected");
            }
        }
        Command::Chapter { direction } => {
            let moved = match *direction {
                Direction::Next => session.next_chapter(),
                Direction::Prev => session.prev_chapter(),
            };
            if moved.is_none() {
                println!("No {} chapter", if matches!(*direction, Direction::Next) { "next" } else { "previous" });
            }
        }
        Command::Bookmark { note } => {
            let bookmark = session.add_bookmark(&mut library, note)?;
            println!("Bookmarked position {}", bookmark.position);
        }
        Command::Bookmarks => {
            for bookmark in library.bookmarks(session.book_key()) {
                println!("{:>8}  {}", bookmark.position, bookmark.note);
            }
        }
        Command::Status => {
            let (current, total) = session.page_number(page_size)?;
            println!("{}", session.title());
            println!("Position: {} of {} characters", session.position(), session.paginator().len());
            println!("Page: {current}/{total} ({page_size} characters per page)");
            if let Some(chapter) = session.current_chapter() {
                println!("Chapter: {}", chapter.title);
            }
        }
    }

    let (current, total) = session.page_number(page_size)?;
    if shows_page {
        let page = session.current_page(page_size)?;
        print_page(&session, &page, current, total);
    }

    session.save_position(&mut library)?;
    library.save(&args.library).await?;
    info!(position = session.position(), current, total, "Saved reading position");

    Ok(())
}
