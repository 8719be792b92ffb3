//! Streaming MBOX splitter.
//!
//! Reads the file line by line through a large buffer and hands every
//! message to a callback as soon as its end is known. Tolerant of:
//!
//! - Mixed `\n` and `\r\n` line endings
//! - `From ` lines not preceded by a blank line (logs a warning)
//! - Truncated messages at EOF
//! - UTF-8 BOM at the start of the file

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{MailError, Result};

const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Messages larger than this are truncated (64 MB).
const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Progress is reported at most every this many bytes.
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// Splits an MBOX file into raw messages.
pub struct MboxParser {
    path: PathBuf,
    file_size: u64,
    max_message_size: usize,
}

impl MboxParser {
    /// Create a splitter for `path`. Only checks that the file exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MailError::FileNotFound(path.clone())
            } else {
                MailError::io(&path, e)
            }
        })?;
        Ok(Self {
            path,
            file_size: metadata.len(),
            max_message_size: MAX_MESSAGE_SIZE,
        })
    }

    /// Override the per-message size cap.
    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max;
        self
    }

    /// Total size of the file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Split the file, calling `on_message` with each message's raw bytes,
    /// `From ` line included. Returning `false` stops early.
    ///
    /// Returns the number of messages delivered.
    pub fn parse(
        &self,
        on_message: &mut dyn FnMut(&[u8]) -> bool,
        progress: Option<&dyn Fn(u64, u64)>,
    ) -> Result<u64> {
        if self.file_size == 0 {
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| MailError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut count: u64 = 0;
        let mut message_buf: Vec<u8> = Vec::with_capacity(64 * 1024);
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut bytes_read: u64 = 0;
        let mut last_progress: u64 = 0;
        let mut prev_line_was_blank = true;
        let mut truncated = false;

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| MailError::io(&self.path, e))?;
            if line_len == 0 {
                break;
            }

            if is_mbox_separator(&line_buf) {
                if !prev_line_was_blank {
                    warn!(
                        offset = bytes_read,
                        "Found 'From ' separator without preceding blank line"
                    );
                }
                if !message_buf.is_empty() {
                    count += 1;
                    if !on_message(&message_buf) {
                        return Ok(count);
                    }
                }
                message_buf.clear();
                truncated = false;
                message_buf.extend_from_slice(&line_buf);
            } else if message_buf.len() + line_buf.len() <= self.max_message_size {
                message_buf.extend_from_slice(&line_buf);
            } else if !truncated {
                warn!(
                    max_size = self.max_message_size,
                    "Message exceeds maximum size, truncating body"
                );
                truncated = true;
            }

            prev_line_was_blank = is_blank_line(&line_buf);
            bytes_read += line_len as u64;

            if let Some(cb) = progress {
                if bytes_read - last_progress >= PROGRESS_INTERVAL {
                    cb(bytes_read, self.file_size);
                    last_progress = bytes_read;
                }
            }
        }

        if !message_buf.is_empty() {
            count += 1;
            on_message(&message_buf);
        }
        if let Some(cb) = progress {
            cb(self.file_size, self.file_size);
        }

        Ok(count)
    }

    /// Collect every message into memory.
    pub fn messages(&self) -> Result<Vec<Vec<u8>>> {
        let mut messages = Vec::new();
        self.parse(
            &mut |raw| {
                messages.push(raw.to_vec());
                true
            },
            None,
        )?;
        Ok(messages)
    }
}

/// `true` if the line starts a new message. A leading BOM is ignored.
pub fn is_mbox_separator(line: &[u8]) -> bool {
    let line = line.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(line);
    line.starts_with(b"From ")
}

fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}
