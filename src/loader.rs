use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for book file loading
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
    /// Memory-map the file instead of buffered async reads
    pub use_mmap: bool,
    /// Maximum title length taken from the first line
    pub max_title_chars: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            use_mmap: false,
            max_title_chars: 50,
        }
    }
}

/// Text encodings tried in order when decoding a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Windows1251,
    Latin1,
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Windows1251 => write!(f, "cp1251"),
            Self::Latin1 => write!(f, "latin-1"),
        }
    }
}

/// Decoded book plus the metadata the reader needs
#[derive(Debug, Clone)]
pub struct LoadedText {
    pub content: String,
    pub title: String,
    pub author: Option<String>,
    pub encoding: TextEncoding,
}

/// Statistics for one load
#[derive(Debug, Clone)]
pub struct LoadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub chars_decoded: u64,
    pub duration_ms: u64,
}

/// Plain-text book loader with encoding fallback
pub struct TextLoader {
    config: LoaderConfig,
}

impl TextLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Read and decode a `.txt` book
    pub async fn load<P: AsRef<Path>>(&self, file_path: P) -> Result<(LoadedText, LoadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        let format = detect_format(path);
        if format != "txt" {
            bail!("Format `{}` is not supported: {}", format, path.display());
        }

        debug!("Starting read of book: {}", path.display());
        let bytes = if self.config.use_mmap {
            read_mmap(path)?
        } else {
            self.read_buffered(path).await?
        };

        let (content, encoding) = decode_text(&bytes);
        if encoding != TextEncoding::Utf8 {
            warn!("{} is not valid UTF-8, decoded as {}", path.display(), encoding);
        }

        let title = extract_title(&content, self.config.max_title_chars);
        let chars_decoded = content.chars().count() as u64;
        let stats = LoadStats {
            file_path: path.display().to_string(),
            bytes_read: bytes.len() as u64,
            chars_decoded,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Loaded {}: {} bytes, {} chars as {} in {}ms",
            path.display(),
            stats.bytes_read,
            stats.chars_decoded,
            encoding,
            stats.duration_ms
        );

        Ok((
            LoadedText {
                content,
                title,
                author: None,
                encoding,
            },
            stats,
        ))
    }

    async fn read_buffered(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open book {}", path.display()))?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .with_context(|| format!("Failed to read book {}", path.display()))?;
        Ok(bytes)
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

fn read_mmap(path: &Path) -> Result<Vec<u8>> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open book {}", path.display()))?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: the map is copied out immediately and dropped before returning
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap.to_vec())
}

/// Lowercased file extension, used as the format name
pub fn detect_format(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Decode as UTF-8 (BOM stripped), then Windows-1251, then Latin-1; line endings become `\n`
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    let (text, encoding) = decode_bytes(bytes);
    (normalize_newlines(text), encoding)
}

fn decode_bytes(bytes: &[u8]) -> (String, TextEncoding) {
    let without_bom = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(without_bom) {
        return (text.to_string(), TextEncoding::Utf8);
    }

    if let Some(text) = decode_windows_1251(bytes) {
        return (text, TextEncoding::Windows1251);
    }

    (bytes.iter().map(|&b| char::from(b)).collect(), TextEncoding::Latin1)
}

/// Translate `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Upper half of Windows-1251; 0x98 is unassigned
const WINDOWS_1251_HIGH: [Option<char>; 64] = [
    Some('\u{0402}'), Some('\u{0403}'), Some('\u{201A}'), Some('\u{0453}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{20AC}'), Some('\u{2030}'), Some('\u{0409}'), Some('\u{2039}'),
    Some('\u{040A}'), Some('\u{040C}'), Some('\u{040B}'), Some('\u{040F}'),
    Some('\u{0452}'), Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    None,             Some('\u{2122}'), Some('\u{0459}'), Some('\u{203A}'),
    Some('\u{045A}'), Some('\u{045C}'), Some('\u{045B}'), Some('\u{045F}'),
    Some('\u{00A0}'), Some('\u{040E}'), Some('\u{045E}'), Some('\u{0408}'),
    Some('\u{00A4}'), Some('\u{0490}'), Some('\u{00A6}'), Some('\u{00A7}'),
    Some('\u{0401}'), Some('\u{00A9}'), Some('\u{0404}'), Some('\u{00AB}'),
    Some('\u{00AC}'), Some('\u{00AD}'), Some('\u{00AE}'), Some('\u{0407}'),
    Some('\u{00B0}'), Some('\u{00B1}'), Some('\u{0406}'), Some('\u{0456}'),
    Some('\u{0491}'), Some('\u{00B5}'), Some('\u{00B6}'), Some('\u{00B7}'),
    Some('\u{0451}'), Some('\u{2116}'), Some('\u{0454}'), Some('\u{00BB}'),
    Some('\u{0458}'), Some('\u{0405}'), Some('\u{0455}'), Some('\u{0457}'),
];

fn decode_windows_1251(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x00..=0x7F => Some(char::from(b)),
            0x80..=0xBF => WINDOWS_1251_HIGH[usize::from(b - 0x80)],
            // А..я are contiguous from U+0410
            0xC0..=0xFF => char::from_u32(0x0410 + u32::from(b - 0xC0)),
        })
        .collect()
}

/// First line, trimmed and truncated, or "Untitled"
pub fn extract_title(content: &str, max_chars: usize) -> String {
    let first_line = content.split('\n').next().unwrap_or_default().trim();
    if first_line.is_empty() {
        "Untitled".to_string()
    } else {
        first_line.chars().take(max_chars).collect()
    }
}

/// Convenience function for loading a book with default configuration
pub async fn load_text<P: AsRef<Path>>(file_path: P) -> Result<LoadedText> {
    let (text, _stats) = TextLoader::default().load(file_path).await?;
    Ok(text)
}
