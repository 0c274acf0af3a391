//! File I/O Module
//!
//! Streams G-code files line by line so that large slicer outputs do not
//! have to be held in memory twice.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// File read statistics
#[derive(Debug, Clone, Default)]
pub struct FileReadStats {
    /// Total bytes read
    pub bytes_read: u64,
    /// Total lines read
    pub lines_read: u64,
    /// Lines that were not valid UTF-8 and were decoded lossily
    pub invalid_utf8_lines: u64,
    /// File size in bytes
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

impl FileReadStats {
    /// Get progress percentage
    pub fn progress_percent(&self) -> f64 {
        if self.file_size == 0 {
            0.0
        } else {
            (self.bytes_read as f64 / self.file_size as f64) * 100.0
        }
    }
}

/// G-code file reader with streaming support
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a new G-code file reader
    ///
    /// # Errors
    /// Returns error if file does not exist or cannot be accessed
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(anyhow!("Not a readable file: {}", path.display()));
        }

        let file_size = fs::metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();

        Ok(Self { path, file_size })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read file with line-by-line streaming callback
    ///
    /// # Errors
    /// Returns error if file cannot be read or callback returns error
    pub fn read_lines<F>(&self, callback: F) -> Result<FileReadStats>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let start = Instant::now();
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut stats = read_lines_lossy(reader, callback)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        stats.file_size = self.file_size;

        stats.read_time_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }
}

/// Stream `reader` line by line, decoding bytes that are not UTF-8 with
/// replacement characters instead of failing.
///
/// The trailing `\n` or `\r\n` is stripped. `bytes_read` counts raw bytes.
/// Only I/O errors and callback errors end the read early.
pub fn read_lines_lossy<R, F, E>(mut reader: R, mut callback: F) -> Result<FileReadStats, E>
where
    R: BufRead,
    F: FnMut(&str) -> Result<(), E>,
    E: From<io::Error>,
{
    let mut stats = FileReadStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        stats.bytes_read += read as u64;

        let mut bytes = buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        let line = match std::str::from_utf8(bytes) {
            Ok(line) => Cow::Borrowed(line),
            Err(_) => {
                stats.invalid_utf8_lines += 1;
                String::from_utf8_lossy(bytes)
            }
        };

        callback(&line)?;
        stats.lines_read += 1;
    }

    if stats.invalid_utf8_lines > 0 {
        debug!("{} line(s) were not valid UTF-8", stats.invalid_utf8_lines);
    }
    Ok(stats)
}
