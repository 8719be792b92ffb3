//! The message being forwarded: envelope plus normalized content.

use chrono::{DateTime, Utc};

use super::address::Address;
use super::attachment::Attachment;

/// A single e-mail on its way to the chat sink.
///
/// The envelope is filled from the raw headers. `body` and `attachments`
/// stay empty until the MIME walker populates them.
#[derive(Debug, Clone)]
pub struct Message {
    /// Senders from the `From:` header.
    pub from: Vec<Address>,

    /// Primary recipients from the `To:` header.
    pub to: Vec<Address>,

    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: String,

    /// Parsed `Date:` header, Unix epoch when missing or unparseable.
    pub date: DateTime<Utc>,

    /// The latest-reply body, HTML when the message had an HTML part.
    pub body: String,

    /// Attachments not seen earlier in this session.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Create a message with an envelope and no content yet.
    pub fn new(from: Vec<Address>, to: Vec<Address>, subject: &str, date: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            subject: subject.to_string(),
            date,
            body: String::new(),
            attachments: Vec::new(),
        }
    }

    /// The first sender, if any.
    pub fn sender(&self) -> Option<&Address> {
        self.from.first()
    }
}
