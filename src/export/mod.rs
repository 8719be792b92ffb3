//! Output of a processing run: saved attachments and per-message reports.

pub mod attachment;
pub mod report;
