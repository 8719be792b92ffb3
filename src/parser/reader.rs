//! Strict message reader: the structured view the MIME walker consumes.

use mail_parser::{Message, MessageParser, MimeHeaders};

use crate::error::{MailError, Result};
use crate::parser::charset;

/// Maximum depth of embedded `message/rfc822` parts that are inspected.
pub const MAX_DEPTH: usize = 10;

/// A message that parsed cleanly and whose top-level charset is decodable by
/// the MIME parser.
///
/// Charsets declared by individual parts are not checked here; the MIME
/// walker decodes or skips those one part at a time.
///
/// The reader owns its bytes (they may be a transcoded copy of the input) and
/// hands out a fresh parsed view on demand.
#[derive(Debug, Clone)]
pub struct MailReader {
    raw: Vec<u8>,
}

impl MailReader {
    /// Strict read of a raw message.
    ///
    /// Fails with [`MailError::UnknownCharset`] when the top-level
    /// `Content-Type` declares a charset without a decoder, so the caller can try
    /// [`charset::normalize_charset`]. Any other failure is a
    /// [`MailError::Parse`].
    pub fn parse(raw_message: &[u8]) -> Result<Self> {
        let bytes = skip_from_line(raw_message);
        let message = MessageParser::default()
            .parse(bytes)
            .ok_or_else(|| MailError::Parse("not an RFC 5322 message".into()))?;

        if let Some(label) = top_level_charset(&message) {
            if !charset::is_known_to_parser(label) {
                return Err(MailError::UnknownCharset {
                    charset: label.to_string(),
                });
            }
        }

        Ok(Self {
            raw: bytes.to_vec(),
        })
    }

    /// The bytes this reader parses.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Parse the stored bytes into a structured message.
    pub fn message(&self) -> Result<Message<'_>> {
        MessageParser::default()
            .parse(&self.raw)
            .ok_or_else(|| MailError::Parse("message no longer parses".into()))
    }
}

/// The `charset` parameter of the message's own `Content-Type`, if any.
pub fn top_level_charset<'m>(message: &'m Message<'_>) -> Option<&'m str> {
    message
        .root_part()
        .content_type()
        .and_then(|ct| ct.attribute("charset"))
}

/// Skip a leading BOM and the `From ` separator line of MBOX messages.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
