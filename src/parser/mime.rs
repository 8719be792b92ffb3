//! MIME walker: turn a parsed message into one reply body plus attachments.
//!
//! Every leaf part is visited in document order. HTML parts go through the
//! HTML stripper, plain-text parts through the text stripper (only while no
//! HTML was found), images and named attachments through the extractor.
//! A text part whose own charset the parser cannot decode is decoded through
//! the charset registry, or skipped when the registry has no decoder either.
//! Nothing that goes wrong with a single part aborts the walk; each part
//! instead reports a [`PartOutcome`].

use std::borrow::Cow;

use mail_parser::decoders::base64::base64_decode;
use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use mail_parser::{Encoding, Message, MessagePart, MimeHeaders, PartType};
use serde::Serialize;
use tracing::debug;

use crate::error::{MailError, Result};
use crate::extract::{self, DedupCache};
use crate::model::attachment::Attachment;
use crate::parser::charset;
use crate::parser::reader::{MailReader, MAX_DEPTH};
use crate::strip::html::strip_html;
use crate::strip::snapshot::SnapshotDir;
use crate::strip::text::strip_text;
use crate::strip::{DiscardReason, Stripped};

/// How a leaf part is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    InlineHtml,
    InlinePlain,
    InlineImage,
    InlineOther,
    Attachment,
}

/// Why a part did not contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The part declares a charset neither the parser nor the registry knows.
    UnknownCharset,
    /// The part body could not be decoded.
    Unreadable,
    /// A non-image attachment without a filename.
    MissingFilename,
    AttachmentsDisabled,
    /// Plain text is only used while no HTML part was seen.
    HtmlAlreadyPresent,
    /// A `text/plain` part whose bytes are really a raster image.
    LooksLikeImage,
    UnsupportedType,
    /// The attachment content was already extracted this session.
    Duplicate { first_filename: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCharset => write!(f, "unknown charset"),
            Self::Unreadable => write!(f, "unreadable body"),
            Self::MissingFilename => write!(f, "attachment has no filename"),
            Self::AttachmentsDisabled => write!(f, "attachments disabled"),
            Self::HtmlAlreadyPresent => write!(f, "HTML body already present"),
            Self::LooksLikeImage => write!(f, "text part contains an image"),
            Self::UnsupportedType => write!(f, "unsupported content type"),
            Self::Duplicate { first_filename } => {
                write!(f, "duplicate of '{first_filename}'")
            }
        }
    }
}

/// What happened to one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PartStatus {
    Decoded,
    Skipped(SkipReason),
    Discarded(DiscardReason),
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decoded => write!(f, "decoded"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Discarded(reason) => write!(f, "discarded: {reason}"),
        }
    }
}

/// Outcome of a single leaf part, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartOutcome {
    /// Position among all visited leaf parts, nested messages included.
    pub index: usize,
    pub kind: PartKind,
    pub content_type: String,
    pub status: PartStatus,
}

/// The result of a walk.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Stripped HTML if any HTML part survived, else stripped plain text, else empty.
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub outcomes: Vec<PartOutcome>,
}

/// One leaf part, classified and decoded.
#[derive(Debug, Clone)]
pub struct Part {
    pub kind: PartKind,
    /// Header string handed to the extractor, e.g. `image/png; name="a.png"`.
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Walk every part of the message behind `reader`.
///
/// A missing reader is the only error. Attachments are collected only when
/// `include_attachments` is set, and only if `cache` has not seen their
/// content before.
pub fn normalize(
    reader: Option<&MailReader>,
    include_attachments: bool,
    cache: &DedupCache,
    snapshots: Option<&SnapshotDir>,
) -> Result<Normalized> {
    let reader = reader.ok_or(MailError::NullInput)?;
    let message = reader.message()?;

    let mut walker = Walker {
        include_attachments,
        cache,
        snapshots,
        html: String::new(),
        text: String::new(),
        result: Normalized::default(),
    };
    walker.walk(&message, 0);

    Ok(walker.result)
}

struct Walker<'a> {
    include_attachments: bool,
    cache: &'a DedupCache,
    snapshots: Option<&'a SnapshotDir>,
    html: String,
    text: String,
    result: Normalized,
}

impl Walker<'_> {
    fn walk(&mut self, message: &Message<'_>, depth: usize) {
        for part in &message.parts {
            match &part.body {
                PartType::Multipart(_) => continue,
                PartType::Message(inner) if !is_attachment(part) => {
                    if depth < MAX_DEPTH {
                        self.walk(inner, depth + 1);
                    } else {
                        debug!(depth, "Not descending into deeply nested message");
                        self.record(
                            PartKind::InlineOther,
                            "message/rfc822".into(),
                            PartStatus::Skipped(SkipReason::UnsupportedType),
                        );
                    }
                }
                _ => match classify(message, part) {
                    Ok(leaf) => {
                        let (kind, content_type) = (leaf.kind, leaf.content_type.clone());
                        let status = self.dispatch(leaf);
                        self.record(kind, content_type, status);
                    }
                    Err((kind, content_type, reason)) => {
                        self.record(kind, content_type, PartStatus::Skipped(reason));
                    }
                },
            }
            self.result.body = self.current_body();
        }
    }

    fn dispatch(&mut self, part: Part) -> PartStatus {
        match part.kind {
            PartKind::InlineHtml => match strip_html(&part.body, self.snapshots) {
                Stripped::Kept(bytes) => {
                    self.html.push_str(&String::from_utf8_lossy(&bytes));
                    PartStatus::Decoded
                }
                Stripped::Discarded(reason) => {
                    debug!(%reason, "Discarding HTML part");
                    PartStatus::Discarded(reason)
                }
            },
            PartKind::InlinePlain => {
                if !self.html.is_empty() {
                    return PartStatus::Skipped(SkipReason::HtmlAlreadyPresent);
                }
                match strip_text(&part.body) {
                    Stripped::Kept(bytes) => {
                        self.text.push_str(&String::from_utf8_lossy(&bytes));
                        PartStatus::Decoded
                    }
                    Stripped::Discarded(reason) => {
                        debug!(%reason, "Discarding text part");
                        PartStatus::Discarded(reason)
                    }
                }
            }
            PartKind::InlineImage | PartKind::Attachment => {
                if !self.include_attachments {
                    return PartStatus::Skipped(SkipReason::AttachmentsDisabled);
                }
                match extract::extract_attachment(&part.body, &part.content_type, self.cache) {
                    Ok(attachment) => {
                        debug!(filename = %attachment.filename, size = attachment.size(), "Extracted attachment");
                        self.result.attachments.push(attachment);
                        PartStatus::Decoded
                    }
                    Err(dup) => PartStatus::Skipped(SkipReason::Duplicate {
                        first_filename: dup.first_filename,
                    }),
                }
            }
            PartKind::InlineOther => {
                debug!(content_type = %part.content_type, "Don't know what to do with this inline part");
                PartStatus::Skipped(SkipReason::UnsupportedType)
            }
        }
    }

    fn record(&mut self, kind: PartKind, content_type: String, status: PartStatus) {
        debug!(index = self.result.outcomes.len(), ?kind, %content_type, %status, "Processed part");
        self.result.outcomes.push(PartOutcome {
            index: self.result.outcomes.len(),
            kind,
            content_type,
            status,
        });
    }

    fn current_body(&self) -> String {
        if !self.html.is_empty() {
            self.html.clone()
        } else {
            self.text.clone()
        }
    }
}

/// Classify a leaf part and read its body.
///
/// Parts that can be rejected before dispatch come back as `Err` with
/// their kind, content type and the reason.
fn classify(
    message: &Message<'_>,
    part: &MessagePart<'_>,
) -> std::result::Result<Part, (PartKind, String, SkipReason)> {
    let mime_type = mime_type(part);

    if is_attachment(part) {
        let content_type = match part.attachment_name() {
            Some(name) if !name.is_empty() => format!("{mime_type}; name=\"{name}\""),
            _ if mime_type.starts_with("image/") => mime_type.clone(),
            _ => return Err((PartKind::Attachment, mime_type, SkipReason::MissingFilename)),
        };
        return Ok(Part {
            kind: PartKind::Attachment,
            content_type,
            body: part.contents().to_vec(),
        });
    }

    let kind = if mime_type.starts_with("text/html") {
        PartKind::InlineHtml
    } else if mime_type.starts_with("text/plain") {
        PartKind::InlinePlain
    } else if mime_type.starts_with("image/") {
        PartKind::InlineImage
    } else {
        PartKind::InlineOther
    };

    if !matches!(kind, PartKind::InlineHtml | PartKind::InlinePlain) {
        return Ok(Part {
            kind,
            content_type: content_type_header(part, &mime_type),
            body: part.contents().to_vec(),
        });
    }

    // Undecodable by the parser: its text is a lossy UTF-8 guess.
    let foreign_charset = part
        .content_type()
        .and_then(|ct| ct.attribute("charset"))
        .filter(|label| !charset::is_known_to_parser(label));
    if foreign_charset.is_some_and(|label| charset::lookup_encoding(label).is_none()) {
        return Err((kind, mime_type, SkipReason::UnknownCharset));
    }

    let raw = transfer_decoded(message, part);
    if kind == PartKind::InlinePlain && looks_like_image(&raw) {
        return Err((kind, mime_type, SkipReason::LooksLikeImage));
    }
    if part.is_encoding_problem {
        return Err((kind, mime_type, SkipReason::Unreadable));
    }

    let body = match foreign_charset.and_then(|label| charset::decode_part(label, &raw)) {
        Some(text) => text.into_bytes(),
        None => part.contents().to_vec(),
    };
    Ok(Part {
        kind,
        content_type: content_type_header(part, &mime_type),
        body,
    })
}

/// A part is an attachment when its disposition says so. Without a
/// disposition, any part other than text, images and embedded messages is
/// one too, and so is a named text part that is neither plain nor HTML.
fn is_attachment(part: &MessagePart<'_>) -> bool {
    if let Some(disposition) = part.content_disposition() {
        return disposition.ctype().eq_ignore_ascii_case("attachment");
    }
    let mime_type = mime_type(part);
    match mime_type.split_once('/').map_or(mime_type.as_str(), |(t, _)| t) {
        "text" => {
            !matches!(mime_type.as_str(), "text/plain" | "text/html")
                && part.attachment_name().is_some_and(|name| !name.is_empty())
        }
        "image" | "message" | "multipart" => false,
        _ => true,
    }
}

/// Lowercase `type/subtype`. A part without a `Content-Type` is plain text.
fn mime_type(part: &MessagePart<'_>) -> String {
    match part.content_type() {
        Some(ct) => match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub).to_ascii_lowercase(),
            None => ct.ctype().to_ascii_lowercase(),
        },
        None => "text/plain".to_string(),
    }
}

/// `type/subtype` followed by the `name` parameter, when there is one.
fn content_type_header(part: &MessagePart<'_>, mime_type: &str) -> String {
    match part.content_type().and_then(|ct| ct.attribute("name")) {
        Some(name) => format!("{mime_type}; name=\"{name}\""),
        None => mime_type.to_string(),
    }
}

/// The part body with only its transfer encoding undone.
///
/// The parser hands out text parts already charset-decoded, which mangles
/// binary content and text in charsets it does not know.
fn transfer_decoded<'m>(message: &'m Message<'_>, part: &'m MessagePart<'_>) -> Cow<'m, [u8]> {
    let raw = message.raw_message();
    let (start, end) = (part.raw_body_offset(), part.raw_end_offset());
    let Some(body) = raw.get(start..end.min(raw.len())) else {
        return Cow::Borrowed(part.contents());
    };

    let decoded = match part.encoding {
        Encoding::None => return Cow::Borrowed(body),
        Encoding::Base64 => base64_decode(body),
        Encoding::QuotedPrintable => quoted_printable_decode(body),
    };
    match decoded {
        Some(bytes) => Cow::Owned(bytes),
        None => Cow::Borrowed(part.contents()),
    }
}

/// `true` if the bytes decode as a PNG, JPEG or GIF image.
pub fn looks_like_image(bytes: &[u8]) -> bool {
    !bytes.is_empty() && image::load_from_memory(bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 1x1 transparent PNG.
    pub(crate) const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn walk(raw: &str, include_attachments: bool) -> Normalized {
        let cache = DedupCache::new();
        walk_with(raw, include_attachments, &cache)
    }

    fn walk_with(raw: &str, include_attachments: bool, cache: &DedupCache) -> Normalized {
        let reader = MailReader::parse(raw.as_bytes()).expect("parses");
        normalize(Some(&reader), include_attachments, cache, None).expect("normalizes")
    }

    fn statuses(n: &Normalized) -> Vec<PartStatus> {
        n.outcomes.iter().map(|o| o.status.clone()).collect()
    }

    fn alternative(first: (&str, &str), second: (&str, &str)) -> String {
        format!(
            "From: a@example.com\r\n\
             Subject: Alt\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
             \r\n\
             --b1\r\n\
             Content-Type: {}; charset=utf-8\r\n\
             \r\n\
             {}\r\n\
             --b1\r\n\
             Content-Type: {}; charset=utf-8\r\n\
             \r\n\
             {}\r\n\
             --b1--\r\n",
            first.0, first.1, second.0, second.1
        )
    }

    #[test]
    fn test_null_reader() {
        let cache = DedupCache::new();
        let err = normalize(None, true, &cache, None).unwrap_err();
        assert!(matches!(err, MailError::NullInput));
    }

    #[test]
    fn test_plain_message() {
        let raw = "Subject: Hi\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nHello there\r\n";
        let n = walk(raw, true);
        assert_eq!(n.body, "Hello there");
        assert!(n.attachments.is_empty());
        assert_eq!(statuses(&n), vec![PartStatus::Decoded]);
        assert_eq!(n.outcomes[0].kind, PartKind::InlinePlain);
    }

    #[test]
    fn test_missing_content_type_is_plain_text() {
        let n = walk("Subject: Hi\r\n\r\nJust text\r\n", true);
        assert_eq!(n.body, "Just text");
    }

    #[test]
    fn test_html_preferred_over_plain() {
        let raw = alternative(
            ("text/plain", "plain version"),
            ("text/html", "<html><head></head><body>html version</body></html>"),
        );
        let n = walk(&raw, true);
        assert!(n.body.contains("html version"));
        assert!(!n.body.contains("plain version"));
        assert_eq!(statuses(&n), vec![PartStatus::Decoded, PartStatus::Decoded]);
    }

    #[test]
    fn test_plain_after_html_is_skipped() {
        let raw = alternative(
            ("text/html", "<html><head></head><body>html version</body></html>"),
            ("text/plain", "plain version"),
        );
        let n = walk(&raw, true);
        assert!(n.body.contains("html version"));
        assert!(!n.body.contains("plain version"));
        assert_eq!(
            n.outcomes[1].status,
            PartStatus::Skipped(SkipReason::HtmlAlreadyPresent)
        );
    }

    #[test]
    fn test_bounce_is_discarded() {
        let raw = alternative(
            ("text/plain", "plain version"),
            (
                "text/html",
                "<p>An error occurred while trying to deliver the mail to the following recipients:</p>",
            ),
        );
        let n = walk(&raw, true);
        assert_eq!(n.body, "plain version");
        assert_eq!(
            n.outcomes[1].status,
            PartStatus::Discarded(DiscardReason::DeliveryFailure)
        );
    }

    fn with_image(disposition: &str) -> String {
        format!(
            "From: a@example.com\r\n\
             Subject: Pic\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
             \r\n\
             --b1\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             See picture\r\n\
             --b1\r\n\
             Content-Type: image/png; name=\"dot.png\"\r\n\
             Content-Disposition: {disposition}\r\n\
             Content-Transfer-Encoding: base64\r\n\
             \r\n\
             {PNG_1X1}\r\n\
             --b1--\r\n"
        )
    }

    #[test]
    fn test_inline_image_extracted() {
        let n = walk(&with_image("inline"), true);
        assert_eq!(n.body, "See picture");
        assert_eq!(n.attachments.len(), 1);
        assert_eq!(n.attachments[0].filename, "dot.png");
        assert!(n.attachments[0].content.starts_with(b"\x89PNG"));
        assert_eq!(n.outcomes[1].kind, PartKind::InlineImage);
    }

    #[test]
    fn test_named_attachment_extracted() {
        let n = walk(&with_image("attachment; filename=\"dot.png\""), true);
        assert_eq!(n.attachments.len(), 1);
        assert_eq!(n.attachments[0].filename, "dot.png");
        assert_eq!(n.outcomes[1].kind, PartKind::Attachment);
    }

    #[test]
    fn test_attachments_disabled() {
        let n = walk(&with_image("inline"), false);
        assert!(n.attachments.is_empty());
        assert_eq!(n.body, "See picture");
        assert_eq!(
            n.outcomes[1].status,
            PartStatus::Skipped(SkipReason::AttachmentsDisabled)
        );
    }

    #[test]
    fn test_duplicate_attachment_across_messages() {
        let cache = DedupCache::new();
        let first = walk_with(&with_image("inline"), true, &cache);
        let second = walk_with(&with_image("inline"), true, &cache);
        assert_eq!(first.attachments.len(), 1);
        assert!(second.attachments.is_empty());
        assert_eq!(
            second.outcomes[1].status,
            PartStatus::Skipped(SkipReason::Duplicate {
                first_filename: "dot.png".into()
            })
        );
    }

    #[test]
    fn test_image_inside_text_part_is_skipped() {
        let raw = format!(
            "Subject: Odd\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain\r\n\
             Content-Transfer-Encoding: base64\r\n\
             \r\n\
             {PNG_1X1}\r\n"
        );
        let n = walk(&raw, true);
        assert_eq!(n.body, "");
        assert_eq!(
            n.outcomes[0].status,
            PartStatus::Skipped(SkipReason::LooksLikeImage)
        );
    }

    #[test]
    fn test_unsupported_inline_type() {
        let raw = "Subject: Cal\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/calendar\r\n\
                   \r\n\
                   BEGIN:VCALENDAR\r\n\
                   --b1--\r\n";
        let n = walk(raw, true);
        assert_eq!(n.body, "");
        assert_eq!(n.outcomes[0].kind, PartKind::InlineOther);
        assert_eq!(
            n.outcomes[0].status,
            PartStatus::Skipped(SkipReason::UnsupportedType)
        );
    }

    #[test]
    fn test_nameless_attachment() {
        let raw = "Subject: Doc\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   Body\r\n\
                   --b1\r\n\
                   Content-Type: application/octet-stream\r\n\
                   Content-Disposition: attachment\r\n\
                   \r\n\
                   data\r\n\
                   --b1--\r\n";
        let n = walk(raw, true);
        assert_eq!(n.body, "Body");
        assert_eq!(
            n.outcomes[1].status,
            PartStatus::Skipped(SkipReason::MissingFilename)
        );
    }

    #[test]
    fn test_embedded_message_is_walked() {
        let raw = "Subject: Fwd\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: message/rfc822\r\n\
                   \r\n\
                   Subject: Inner\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   Inner text\r\n\
                   --b1--\r\n";
        let n = walk(raw, true);
        assert_eq!(n.body, "Inner text");
        assert_eq!(n.outcomes.len(), 1);
    }

    #[test]
    fn test_unknown_part_charset_skips_only_that_part() {
        let raw = "From: a@example.com\r\n\
                   Subject: Alt\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain; charset=x-made-up\r\n\
                   \r\n\
                   plain version\r\n\
                   --b1\r\n\
                   Content-Type: text/html; charset=utf-8\r\n\
                   \r\n\
                   <p>html version</p>\r\n\
                   --b1--\r\n";
        let n = walk(raw, true);
        assert!(n.body.contains("html version"));
        assert_eq!(
            statuses(&n),
            vec![
                PartStatus::Skipped(SkipReason::UnknownCharset),
                PartStatus::Decoded
            ]
        );
    }

    #[test]
    fn test_registered_alias_in_nested_part_is_decoded() {
        let raw = "Subject: Menu\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain; charset=cp-1252\r\n\
                   Content-Transfer-Encoding: quoted-printable\r\n\
                   \r\n\
                   Le caf=E9 est ouvert.\r\n\
                   --b1--\r\n";
        let reader = crate::parser::charset::read_message(raw.as_bytes())
            .expect("no error")
            .expect("readable");
        let cache = DedupCache::new();
        let n = normalize(Some(&reader), true, &cache, None).expect("normalizes");
        assert_eq!(n.body, "Le caf\u{e9} est ouvert.");
        assert_eq!(statuses(&n), vec![PartStatus::Decoded]);
    }

    #[test]
    fn test_named_part_without_disposition_is_attachment() {
        let raw = "Subject: Report\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain; charset=utf-8\r\n\
                   \r\n\
                   See attached\r\n\
                   --b1\r\n\
                   Content-Type: application/pdf; name=\"report.pdf\"\r\n\
                   Content-Transfer-Encoding: base64\r\n\
                   \r\n\
                   JVBERi0xLjQgdGVzdA==\r\n\
                   --b1--\r\n";
        let n = walk(raw, true);
        assert_eq!(n.body, "See attached");
        assert_eq!(n.attachments.len(), 1);
        assert_eq!(n.attachments[0].filename, "report.pdf");
        assert_eq!(n.attachments[0].content, b"%PDF-1.4 test");
        assert_eq!(n.outcomes[1].kind, PartKind::Attachment);
    }

    #[test]
    fn test_unreadable_part_is_skipped() {
        let raw = "Subject: Broken\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain; charset=utf-8\r\n\
                   \r\n\
                   Still here\r\n\
                   --b1\r\n\
                   Content-Type: text/plain; charset=utf-8\r\n\
                   Content-Transfer-Encoding: base64\r\n\
                   \r\n\
                   @@@ not base64 @@@\r\n\
                   --b1--\r\n";
        let n = walk(raw, true);
        assert_eq!(n.body, "Still here");
        assert_eq!(
            statuses(&n),
            vec![
                PartStatus::Decoded,
                PartStatus::Skipped(SkipReason::Unreadable)
            ]
        );
    }

    #[test]
    fn test_looks_like_image() {
        let png = base64_decode(PNG_1X1.as_bytes()).unwrap();
        assert!(looks_like_image(&png));
        assert!(!looks_like_image(b"plain words"));
        assert!(!looks_like_image(b""));
    }
}
