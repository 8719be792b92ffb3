//! Centralized error types for mail2chat.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mail2chat library.
///
/// Only a few of these ever leave the core: [`MailError::NullInput`] from the
/// MIME walker and [`MailError::InvalidTimeRange`] from the filter evaluator.
/// Everything that goes wrong with a single part is recorded as a
/// [`crate::parser::mime::PartOutcome`] instead.
#[derive(Error, Debug)]
pub enum MailError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Mail file not found: {0}")]
    FileNotFound(PathBuf),

    /// The message declares a charset the MIME parser cannot decode.
    #[error("Unknown charset: {charset}")]
    UnknownCharset { charset: String },

    /// The charset parameter could not be read from the `Content-Type` header.
    #[error("Could not read charset from Content-Type header")]
    MissingCharset,

    /// The message could not be parsed at all.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No message reader was supplied to the body extractor.
    #[error("nil reader")]
    NullInput,

    /// The profile's `time_range` is not a valid duration.
    #[error("Invalid time range '{value}': {reason}")]
    InvalidTimeRange { value: String, reason: String },

    /// The configuration file is malformed.
    #[error("Configuration error in '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    /// The requested profile does not exist.
    #[error("No profile with index {0}")]
    NoSuchProfile(usize),
}

/// Convenience alias for `Result<T, MailError>`.
pub type Result<T> = std::result::Result<T, MailError>;

impl MailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` if this is the recoverable unknown-charset signal.
    pub fn is_unknown_charset(&self) -> bool {
        matches!(self, Self::UnknownCharset { .. })
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `MailError`
/// when no path context is available (rare, prefer `MailError::io`).
impl From<std::io::Error> for MailError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
