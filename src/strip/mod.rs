//! Reply stripping: reduce a message body to its latest reply.
//!
//! Both pipelines are ordered tables of [`RewriteRule`]s applied to the whole
//! buffer, one after the other. Several rules only work because an earlier
//! one already ran (most HTML rules assume line breaks are gone), so the
//! tables must not be reordered casually.

pub mod html;
pub mod snapshot;
pub mod text;

use regex::bytes::Regex;
use serde::Serialize;

/// Phrase that identifies a mail-system bounce notice.
pub const DELIVERY_FAILURE_PHRASE: &str =
    "An error occurred while trying to deliver the mail to the following recipients:";

/// One match-and-replace step of a stripping pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    /// Short identifier used in logs and tests.
    pub name: &'static str,
    /// Pattern matched against the whole buffer.
    pub pattern: &'static str,
    /// Replacement, may reference capture groups as `${1}`.
    pub replacement: &'static str,
}

/// A [`RewriteRule`] with its pattern compiled.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: RewriteRule,
    pub regex: Regex,
}

impl CompiledRule {
    /// Apply this rule to `input`.
    pub fn apply(&self, input: &[u8]) -> Vec<u8> {
        self.regex
            .replace_all(input, self.rule.replacement.as_bytes())
            .into_owned()
    }
}

/// Compile a rule table. Patterns are static, so a bad one is a programming error.
pub(crate) fn compile(rules: &[RewriteRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .map(|rule| CompiledRule {
            rule: *rule,
            regex: Regex::new(rule.pattern)
                .unwrap_or_else(|e| panic!("invalid rewrite rule '{}': {e}", rule.name)),
        })
        .collect()
}

/// Run every rule in order.
pub(crate) fn apply_all(rules: &[CompiledRule], input: &[u8]) -> Vec<u8> {
    rules
        .iter()
        .fold(input.to_vec(), |buf, rule| rule.apply(&buf))
}

/// Why a body's contribution was dropped on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// The body is a mail-delivery-failure notice.
    DeliveryFailure,
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeliveryFailure => write!(f, "Ignoring postal service error"),
        }
    }
}

/// Result of running a stripping pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stripped {
    /// The reduced body.
    Kept(Vec<u8>),
    /// The body must not contribute to the message.
    Discarded(DiscardReason),
}

impl Stripped {
    /// The reduced body, if it was kept.
    pub fn kept(self) -> Option<Vec<u8>> {
        match self {
            Self::Kept(bytes) => Some(bytes),
            Self::Discarded(_) => None,
        }
    }
}

/// `true` if the body is a bounce notice.
pub(crate) fn is_delivery_failure(input: &[u8]) -> bool {
    let needle = DELIVERY_FAILURE_PHRASE.as_bytes();
    input.windows(needle.len()).any(|window| window == needle)
}
