//! Before/after captures of HTML bodies, for tuning the stripping rules offline.
//!
//! Files are named after the SHA-256 of the *input* body: `<digest>.in` holds
//! the original, `<digest>.out` the stripped result. Existing files are never
//! overwritten. Every failure is logged and otherwise ignored.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Directory that receives snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    /// Use `root` for snapshots. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the snapshots are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the snapshot for `digest` with the given suffix (`in` / `out`).
    pub fn path_for(&self, digest: &str, suffix: &str) -> PathBuf {
        self.root.join(format!("{digest}.{suffix}"))
    }

    /// Write `data` unless a snapshot with that name already exists.
    pub fn capture(&self, digest: &str, suffix: &str, data: &[u8]) {
        let path = self.path_for(digest, suffix);
        if path.exists() {
            return;
        }
        if let Err(e) = std::fs::create_dir_all(&self.root) {
            warn!(dir = %self.root.display(), error = %e, "Could not create snapshot directory");
            return;
        }
        match std::fs::write(&path, data) {
            Ok(()) => debug!(path = %path.display(), "Wrote body snapshot"),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not write body snapshot"),
        }
    }
}
