//! Write extracted attachments to disk.

use std::path::{Path, PathBuf};

use crate::model::attachment::Attachment;
use crate::model::message::Message;

/// Write every attachment of `message` into its own subfolder of `output_dir`.
///
/// The subfolder is named `{date}_{subject}`. Existing files are never
/// overwritten; a counter is appended instead.
pub fn save_attachments(message: &Message, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if message.attachments.is_empty() {
        return Ok(Vec::new());
    }

    let folder = output_dir.join(message_folder_name(message));
    std::fs::create_dir_all(&folder)?;

    let mut paths = Vec::with_capacity(message.attachments.len());
    for attachment in &message.attachments {
        match save_attachment(attachment, &folder) {
            Ok(path) => paths.push(path),
            Err(e) => {
                tracing::warn!(
                    filename = %attachment.filename,
                    error = %e,
                    "Failed to save attachment"
                );
            }
        }
    }
    Ok(paths)
}

/// Write a single attachment into `dir`.
pub fn save_attachment(attachment: &Attachment, dir: &Path) -> anyhow::Result<PathBuf> {
    let filename = sanitize_filename_part(&attachment.filename, 150);
    let path = unique_path(&dir.join(filename));
    std::fs::write(&path, &attachment.content)?;
    tracing::debug!(path = %path.display(), size = attachment.size(), "Saved attachment");
    Ok(path)
}

fn message_folder_name(message: &Message) -> String {
    let date = message.date.format("%Y%m%d_%H%M%S").to_string();
    let subject = sanitize_filename_part(&message.subject, 60);
    format!("{date}_{subject}")
}

/// Replace characters that are unsafe in filenames and cap the length.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "unknown".to_string()
    } else {
        sanitized
    }
}

/// If `path` already exists, append a counter to make it unique.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    let with_suffix = |suffix: &str| {
        if ext.is_empty() {
            parent.join(format!("{stem}_{suffix}"))
        } else {
            parent.join(format!("{stem}_{suffix}.{ext}"))
        }
    };

    (1..1000)
        .map(|i| with_suffix(&i.to_string()))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| with_suffix("dup"))
}
