//! Local mail sources: single `.eml` files, MBOX files, and directories of `.eml` files.

pub mod mbox;

use std::path::Path;

use tracing::{debug, info};

use crate::error::{MailError, Result};

/// One raw message and where it came from.
#[derive(Debug, Clone)]
pub struct RawMail {
    /// File path, with `#<n>` appended for messages inside an MBOX.
    pub origin: String,
    pub bytes: Vec<u8>,
}

/// Load every message found at `path`.
///
/// A directory yields its `.eml` files in name order. A file is treated as
/// MBOX when it starts with a `From ` line, as a single message otherwise.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<RawMail>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MailError::FileNotFound(path.to_path_buf()));
    }

    if path.is_dir() {
        return load_dir(path);
    }

    let bytes = std::fs::read(path).map_err(|e| MailError::io(path, e))?;
    let first_line_end = bytes.iter().position(|&b| b == b'\n').unwrap_or(bytes.len());
    if mbox::is_mbox_separator(&bytes[..first_line_end]) {
        let messages = mbox::MboxParser::new(path)?.messages()?;
        info!(path = %path.display(), count = messages.len(), "Loaded MBOX");
        return Ok(messages
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| RawMail {
                origin: format!("{}#{}", path.display(), i + 1),
                bytes,
            })
            .collect());
    }

    Ok(vec![RawMail {
        origin: path.display().to_string(),
        bytes,
    }])
}

fn load_dir(dir: &Path) -> Result<Vec<RawMail>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| MailError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
        })
        .collect();
    paths.sort();

    debug!(dir = %dir.display(), count = paths.len(), "Found .eml files");
    paths
        .into_iter()
        .map(|p| {
            let bytes = std::fs::read(&p).map_err(|e| MailError::io(&p, e))?;
            Ok(RawMail {
                origin: p.display().to_string(),
                bytes,
            })
        })
        .collect()
}
