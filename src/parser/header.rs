//! Envelope extraction: `From`, `To`, `Subject` and `Date` of a raw message.
//!
//! Only the header block is parsed, so filters can run before any MIME
//! decoding happens. Folding, RFC 2047 encoded-words and the many date
//! variants are handled by `mail-parser`.

use chrono::{DateTime, Utc};
use mail_parser::MessageParser;
use tracing::warn;

use crate::model::address::Address;
use crate::model::message::Message;
use crate::parser::reader::skip_from_line;

/// Build a [`Message`] envelope from a raw message (headers + body).
///
/// A missing or unparseable `Date` becomes the Unix epoch. The body is not
/// touched.
pub fn parse_envelope(raw_message: &[u8]) -> Message {
    let bytes = skip_from_line(raw_message);
    let Some(parsed) = MessageParser::default().parse_headers(bytes) else {
        warn!("Could not parse message headers");
        return Message::new(Vec::new(), Vec::new(), "", DateTime::UNIX_EPOCH);
    };

    let from = Address::list(parsed.from());
    let to = Address::list(parsed.to());
    let subject = parsed.subject().unwrap_or_default();

    let date = match parsed.date() {
        Some(date) if date.is_valid() => DateTime::<Utc>::from_timestamp(date.to_timestamp(), 0)
            .unwrap_or(DateTime::UNIX_EPOCH),
        Some(date) => {
            warn!(date = %date.to_rfc3339(), "Could not parse date");
            DateTime::UNIX_EPOCH
        }
        None => DateTime::UNIX_EPOCH,
    };

    Message::new(from, to, subject, date)
}

/// Byte offset where the header block ends (the first blank line).
pub fn find_header_end(data: &[u8]) -> Option<usize> {
    for i in 0..data.len().saturating_sub(1) {
        if data[i] == b'\n' && data[i + 1] == b'\n' {
            return Some(i);
        }
        if data[i..].starts_with(b"\r\n\r\n") {
            return Some(i);
        }
    }
    None
}
