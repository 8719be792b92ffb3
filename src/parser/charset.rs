//! Charset recovery for messages that declare a charset the MIME parser
//! does not know.
//!
//! The registry is `encoding_rs` plus a few aliases seen in the wild. When the
//! strict read fails with [`MailError::UnknownCharset`], the top-level header
//! block is rewritten to name a charset the parser can decode, and the message
//! is read again. Parts with their own unknown charset are decoded one at a
//! time by the MIME walker through [`decode_part`].

use std::borrow::Cow;

use std::sync::LazyLock;

use encoding_rs::Encoding;
use mail_parser::decoders::charsets::map::charset_decoder;
use mail_parser::MessageParser;
use regex::bytes::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::{MailError, Result};
use crate::parser::header;
use crate::parser::reader::{self, MailReader};

/// Labels that `encoding_rs` does not know but real mailers emit.
const EXTRA_CHARSETS: &[(&str, &Encoding)] = &[
    ("cp-1252", encoding_rs::WINDOWS_1252),
    ("win-1252", encoding_rs::WINDOWS_1252),
    ("latin-1", encoding_rs::WINDOWS_1252),
    ("utf8mb4", encoding_rs::UTF_8),
    ("ks_c_5601", encoding_rs::EUC_KR),
];

static CHARSET_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(charset\s*=\s*)"?([A-Za-z0-9_.:+-]+)"?"#).expect("valid charset regex")
});

/// Strict read, falling back to [`normalize_charset`] on an unknown charset.
///
/// `Ok(None)` means the message declares a charset nothing can decode; the
/// caller should skip it rather than fail.
pub fn read_message(raw_message: &[u8]) -> Result<Option<MailReader>> {
    match MailReader::parse(raw_message) {
        Ok(reader) => Ok(Some(reader)),
        Err(err) if err.is_unknown_charset() => {
            debug!(error = %err, "Charset error, trying to convert");
            normalize_charset(raw_message, err)
        }
        Err(err) => Err(err),
    }
}

/// Re-read a message whose strict read failed with an unknown charset.
///
/// - any error other than [`MailError::UnknownCharset`] is returned unchanged;
/// - a missing top-level `Content-Type` or `charset` parameter is
///   [`MailError::MissingCharset`];
/// - a declared charset without a registered decoder yields `Ok(None)`.
///
/// When the parser knows the registry's canonical name for the charset, only
/// the label is rewritten and the bytes stay as they are. Otherwise the whole
/// buffer is transcoded to UTF-8 and relabeled `utf-8`. Either way only the
/// top-level header block is touched.
pub fn normalize_charset(raw_message: &[u8], err: MailError) -> Result<Option<MailReader>> {
    if !err.is_unknown_charset() {
        return Err(err);
    }

    let bytes = reader::skip_from_line(raw_message);
    let declared = MessageParser::default()
        .parse_headers(bytes)
        .and_then(|message| reader::top_level_charset(&message).map(str::to_string))
        .filter(|label| !label.trim().is_empty())
        .ok_or(MailError::MissingCharset)?;

    let Some(encoding) = lookup_encoding(&declared) else {
        warn!(charset = %declared, "Charset error, could not convert");
        return Ok(None);
    };

    let rewritten: Vec<u8> = if is_known_to_parser(encoding.name()) {
        relabel_headers(bytes, encoding.name())
    } else {
        let (utf8, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            debug!(charset = %declared, "Malformed sequences replaced while converting");
        }
        relabel_headers(utf8.as_bytes(), "utf-8")
    };

    match MailReader::parse(&rewritten) {
        Ok(reader) => Ok(Some(reader)),
        Err(MailError::UnknownCharset { charset }) => {
            warn!(charset = %charset, "Charset error, could not convert");
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

/// Find a decoder for a charset label.
pub fn lookup_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    EXTRA_CHARSETS
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(label))
        .map(|(_, encoding)| *encoding)
        .or_else(|| Encoding::for_label(label.as_bytes()))
}

/// `true` if `mail-parser` can decode text declared with this label.
pub fn is_known_to_parser(label: &str) -> bool {
    let lower = label.trim().to_ascii_lowercase();
    matches!(lower.as_str(), "utf-8" | "utf8" | "us-ascii" | "ascii")
        || charset_decoder(lower.as_bytes()).is_some()
}

/// Decode the transfer-decoded bytes of a text part declared with `label`.
///
/// `None` when the registry has no decoder for the label.
pub fn decode_part(label: &str, bytes: &[u8]) -> Option<String> {
    let encoding = lookup_encoding(label)?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(charset = label, "Malformed sequences replaced in part");
    }
    Some(text.into_owned())
}

/// Rewrite the `charset=` declarations of the top-level header block that
/// the parser cannot decode to `new_label`. The body is copied unchanged.
fn relabel_headers(raw: &[u8], new_label: &str) -> Vec<u8> {
    let end = header::find_header_end(raw).unwrap_or(raw.len());
    let (head, body) = raw.split_at(end);

    let head: Cow<'_, [u8]> = CHARSET_DECL.replace_all(head, |caps: &Captures<'_>| {
        let label = String::from_utf8_lossy(&caps[2]);
        if is_known_to_parser(&label) {
            caps[0].to_vec()
        } else {
            [&caps[1], new_label.as_bytes()].concat()
        }
    });
    [head.as_ref(), body].concat()
}
