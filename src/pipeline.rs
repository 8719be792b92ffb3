//! One message from raw bytes to a forwardable [`Message`].

use tracing::{debug, warn};

use crate::config::Profile;
use crate::error::Result;
use crate::extract::DedupCache;
use crate::filter;
use crate::model::message::Message;
use crate::parser::mime::{self, PartOutcome};
use crate::parser::{charset, header};
use crate::strip::snapshot::SnapshotDir;

/// What became of a message.
#[derive(Debug, Clone)]
pub enum Processed {
    /// The profile's filter rejected it. Only the envelope is filled in.
    Filtered { message: Message },
    /// Body and attachments are populated. A message that could not be
    /// decoded at all is accepted with an empty body and no outcomes.
    Accepted {
        message: Message,
        outcomes: Vec<PartOutcome>,
    },
}

impl Processed {
    /// The message, whatever its fate.
    pub fn message(&self) -> &Message {
        match self {
            Self::Filtered { message } | Self::Accepted { message, .. } => message,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Filter, decode and normalize one raw message for `profile`.
///
/// `cache` must be shared by every call of one run so that attachments are
/// forwarded only once. The only error is a malformed `time_range`.
pub fn process_message(
    raw: &[u8],
    profile: &Profile,
    cache: &DedupCache,
    snapshots: Option<&SnapshotDir>,
) -> Result<Processed> {
    let mut message = header::parse_envelope(raw);

    if !filter::evaluate(&profile.filter, &message)? {
        return Ok(Processed::Filtered { message });
    }

    let reader = match charset::read_message(raw) {
        Ok(Some(reader)) => reader,
        Ok(None) => {
            debug!(subject = %message.subject, "Message body could not be decoded");
            return Ok(Processed::Accepted {
                message,
                outcomes: Vec::new(),
            });
        }
        Err(e) => {
            warn!(subject = %message.subject, error = %e, "Unreadable message, forwarding without body");
            return Ok(Processed::Accepted {
                message,
                outcomes: Vec::new(),
            });
        }
    };

    let normalized = mime::normalize(
        Some(&reader),
        profile.chat.mail_attachments,
        cache,
        snapshots,
    )?;
    message.body = normalized.body;
    message.attachments = normalized.attachments;

    Ok(Processed::Accepted {
        message,
        outcomes: normalized.outcomes,
    })
}
