//! Per-message processing reports, as text or JSON.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::mime::PartOutcome;
use crate::pipeline::Processed;

/// Outcome of one message, flattened for output.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub origin: String,
    pub status: ReportStatus,
    pub subject: String,
    pub from: Vec<String>,
    pub date: DateTime<Utc>,
    pub body: String,
    pub attachments: Vec<AttachmentSummary>,
    pub parts: Vec<PartOutcome>,
    /// Attachment files written, when saving was requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub saved: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Accepted,
    Filtered,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentSummary {
    pub filename: String,
    pub size: u64,
}

impl MessageReport {
    pub fn new(origin: &str, processed: &Processed) -> Self {
        let message = processed.message();
        let (status, parts) = match processed {
            Processed::Filtered { .. } => (ReportStatus::Filtered, Vec::new()),
            Processed::Accepted { outcomes, .. } => (ReportStatus::Accepted, outcomes.clone()),
        };
        Self {
            origin: origin.to_string(),
            status,
            subject: message.subject.clone(),
            from: message.from.iter().map(|a| a.addr_spec()).collect(),
            date: message.date,
            body: message.body.clone(),
            attachments: message
                .attachments
                .iter()
                .map(|a| AttachmentSummary {
                    filename: a.filename.clone(),
                    size: a.size(),
                })
                .collect(),
            parts,
            saved: Vec::new(),
        }
    }

    /// Human-readable rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let status = match self.status {
            ReportStatus::Accepted => "accepted",
            ReportStatus::Filtered => "filtered",
        };
        let _ = writeln!(out, "== {} [{status}]", self.origin);
        let _ = writeln!(out, "Date:    {}", self.date.format("%a, %d %b %Y %H:%M:%S %z"));
        let _ = writeln!(out, "From:    {}", self.from.join(", "));
        let _ = writeln!(out, "Subject: {}", self.subject);

        if self.status == ReportStatus::Filtered {
            return out;
        }

        for part in &self.parts {
            let _ = writeln!(
                out,
                "  part {:>2}  {:<28} {}",
                part.index, part.content_type, part.status
            );
        }

        let _ = writeln!(out, "{}", "-".repeat(72));
        if self.body.is_empty() {
            let _ = writeln!(out, "(no body)");
        } else {
            let _ = writeln!(out, "{}", self.body);
        }

        if !self.attachments.is_empty() {
            let _ = writeln!(out, "\n[Attachments: {} file(s)]", self.attachments.len());
            for att in &self.attachments {
                let size = humansize::format_size(att.size, humansize::BINARY);
                let _ = writeln!(out, "  - {} ({size})", att.filename);
            }
        }
        for path in &self.saved {
            let _ = writeln!(out, "  saved {path}");
        }
        out
    }
}
