//! Per-profile acceptance filters, evaluated on envelope metadata only.

pub mod duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MailError, Result};
use crate::model::address::Address;
use crate::model::message::Message;

/// Which messages a profile wants to see.
///
/// `folders` and `unseen` steer the mail source and are not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub folders: Vec<String>,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub subject: Vec<String>,
    pub unseen: bool,
    /// Maximum message age, e.g. `"24h"`. Empty means no limit.
    pub time_range: Option<String>,
}

/// Decide whether `message` passes `spec`, relative to the current time.
pub fn evaluate(spec: &FilterSpec, message: &Message) -> Result<bool> {
    evaluate_at(spec, message, Utc::now())
}

/// Like [`evaluate`], with an explicit notion of "now".
///
/// All of From, To, Subject and the time range must match. An empty list
/// matches everything; otherwise any configured substring has to occur in
/// any candidate. A malformed time range is an error, never a rejection.
pub fn evaluate_at(spec: &FilterSpec, message: &Message, now: DateTime<Utc>) -> Result<bool> {
    if !matches_addresses(&spec.from, &message.from) {
        debug!(subject = %message.subject, "Rejected by From filter");
        return Ok(false);
    }
    if !matches_addresses(&spec.to, &message.to) {
        debug!(subject = %message.subject, "Rejected by To filter");
        return Ok(false);
    }
    if !matches_any(&spec.subject, std::iter::once(message.subject.clone())) {
        debug!(subject = %message.subject, "Rejected by Subject filter");
        return Ok(false);
    }

    if let Some(range) = spec.time_range.as_deref().filter(|r| !r.is_empty()) {
        let max_age = duration::parse_duration(range).map_err(|reason| {
            MailError::InvalidTimeRange {
                value: range.to_string(),
                reason,
            }
        })?;
        if message.date < now - max_age {
            debug!(subject = %message.subject, date = %message.date, "Rejected by time range");
            return Ok(false);
        }
    }

    Ok(true)
}

fn matches_addresses(patterns: &[String], addresses: &[Address]) -> bool {
    matches_any(patterns, addresses.iter().map(Address::addr_spec))
}

fn matches_any(patterns: &[String], mut candidates: impl Iterator<Item = String>) -> bool {
    if patterns.is_empty() {
        return true;
    }
    candidates.any(|candidate| patterns.iter().any(|p| candidate.contains(p.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn message(age: TimeDelta) -> Message {
        Message::new(
            vec![Address::new("Alice", "alice", "example.com")],
            vec![
                Address::new("", "team", "lists.example.org"),
                Address::new("", "bob", "example.net"),
            ],
            "[ops] Disk almost full",
            now() - age,
        )
    }

    fn spec() -> FilterSpec {
        FilterSpec::default()
    }

    #[test]
    fn test_empty_spec_accepts_everything() {
        let old = message(TimeDelta::days(4000));
        assert!(evaluate_at(&spec(), &old, now()).unwrap());

        let empty = Message::new(vec![], vec![], "", now());
        assert!(evaluate_at(&spec(), &empty, now()).unwrap());
    }

    #[test]
    fn test_from_substring() {
        let msg = message(TimeDelta::zero());
        let mut f = spec();
        f.from = vec!["@example.com".into()];
        assert!(evaluate_at(&f, &msg, now()).unwrap());

        f.from = vec!["carol".into(), "alice@".into()];
        assert!(evaluate_at(&f, &msg, now()).unwrap());

        f.from = vec!["bob".into()];
        assert!(!evaluate_at(&f, &msg, now()).unwrap());
    }

    #[test]
    fn test_to_matches_any_recipient() {
        let msg = message(TimeDelta::zero());
        let mut f = spec();
        f.to = vec!["bob@example.net".into()];
        assert!(evaluate_at(&f, &msg, now()).unwrap());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let msg = message(TimeDelta::zero());
        let mut f = spec();
        f.subject = vec!["[OPS]".into()];
        assert!(!evaluate_at(&f, &msg, now()).unwrap());

        f.subject = vec!["[ops]".into()];
        assert!(evaluate_at(&f, &msg, now()).unwrap());
    }

    #[test]
    fn test_personal_name_is_not_a_candidate() {
        let msg = message(TimeDelta::zero());
        let mut f = spec();
        f.from = vec!["Alice".into()];
        assert!(!evaluate_at(&f, &msg, now()).unwrap());
    }

    #[test]
    fn test_all_categories_must_match() {
        let msg = message(TimeDelta::zero());
        let mut f = spec();
        f.from = vec!["alice".into()];
        f.subject = vec!["nothing like it".into()];
        assert!(!evaluate_at(&f, &msg, now()).unwrap());
    }

    #[test]
    fn test_time_range() {
        let mut f = spec();
        f.time_range = Some("24h".into());
        assert!(!evaluate_at(&f, &message(TimeDelta::hours(48)), now()).unwrap());
        assert!(evaluate_at(&f, &message(TimeDelta::hours(1)), now()).unwrap());
        assert!(evaluate_at(&f, &message(TimeDelta::hours(24)), now()).unwrap());
    }

    #[test]
    fn test_malformed_time_range_is_an_error() {
        let mut f = spec();
        f.time_range = Some("notaduration".into());
        let err = evaluate_at(&f, &message(TimeDelta::zero()), now()).unwrap_err();
        assert!(matches!(err, MailError::InvalidTimeRange { ref value, .. } if value == "notaduration"));
    }

    #[test]
    fn test_empty_time_range_is_no_limit() {
        let mut f = spec();
        f.time_range = Some(String::new());
        assert!(evaluate_at(&f, &message(TimeDelta::days(365)), now()).unwrap());
    }

    #[test]
    fn test_time_range_checked_only_after_substrings() {
        let mut f = spec();
        f.from = vec!["nobody".into()];
        f.time_range = Some("notaduration".into());
        assert!(!evaluate_at(&f, &message(TimeDelta::zero()), now()).unwrap());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let f: FilterSpec = toml::from_str(
            r#"
folders = ["INBOX"]
subject = ["[team]"]
unseen = true
time_range = "1h30m"
"#,
        )
        .unwrap();
        assert_eq!(f.folders, vec!["INBOX"]);
        assert!(f.from.is_empty());
        assert!(f.unseen);
        assert_eq!(f.time_range.as_deref(), Some("1h30m"));
    }
}
