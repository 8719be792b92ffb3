//! Attachment extraction with session-wide content deduplication.
//!
//! Mail clients re-attach the same files on every "Reply all". The cache
//! remembers the SHA-256 of every attachment handed out during a run so that
//! each distinct file is forwarded only once. It lives as long as the run and
//! is never persisted.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::model::attachment::Attachment;

/// Filename used when nothing better can be derived.
pub const FALLBACK_FILENAME: &str = "image";

static NAME_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="([^"]+)""#).expect("valid name regex"));
static IMAGE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"image/([a-z]*)").expect("valid image regex"));

/// SHA-256 of attachment content.
pub type ContentDigest = [u8; 32];

/// Digests of every attachment extracted during this run.
///
/// Create one per run and pass it by reference to every extraction.
/// Lookup and insert happen under one lock, so two identical attachments
/// processed concurrently cannot both be treated as new.
#[derive(Debug, Default)]
pub struct DedupCache {
    seen: Mutex<HashMap<ContentDigest, String>>,
}

impl DedupCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `digest` under `filename` unless it was already seen.
    ///
    /// Returns the filename recorded first when the digest is a duplicate.
    pub fn insert_new(&self, digest: ContentDigest, filename: &str) -> Result<(), String> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        match seen.entry(digest) {
            Entry::Occupied(first) => Err(first.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(filename.to_string());
                Ok(())
            }
        }
    }

    /// `true` if content with this digest was already extracted.
    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(digest)
    }

    /// Number of distinct attachments seen.
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// `true` if nothing was extracted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The content was already extracted earlier in this session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("attachment already seen as '{first_filename}'")]
pub struct Duplicate {
    /// Filename the content was first extracted under.
    pub first_filename: String,
}

/// Package a binary part as an [`Attachment`], unless its content was seen before.
///
/// `header` is a content-type or disposition string such as
/// `image/png; name="chart.png"`. The filename comes from its `name="…"`
/// parameter, else `image.<subtype>` for image types, else `"image"`.
pub fn extract_attachment(
    body: &[u8],
    header: &str,
    cache: &DedupCache,
) -> Result<Attachment, Duplicate> {
    let filename = derive_filename(header);
    let digest = content_digest(body);

    cache
        .insert_new(digest, &filename)
        .map_err(|first_filename| {
            debug!(filename = %filename, first = %first_filename, "Skipping duplicate attachment");
            Duplicate { first_filename }
        })?;

    Ok(Attachment {
        filename,
        content: body.to_vec(),
    })
}

/// Derive a filename from a content-type or disposition string.
pub fn derive_filename(header: &str) -> String {
    if let Some(name) = NAME_PARAM.captures(header).map(|c| c[1].to_string()) {
        return name;
    }
    match IMAGE_TYPE.captures(header) {
        Some(c) => format!("image.{}", &c[1]),
        None => FALLBACK_FILENAME.to_string(),
    }
}

/// SHA-256 of `data`.
pub fn content_digest(data: &[u8]) -> ContentDigest {
    Sha256::digest(data).into()
}

/// Lowercase hex form of a digest, as used for snapshot file names.
pub fn to_hex(digest: &ContentDigest) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
