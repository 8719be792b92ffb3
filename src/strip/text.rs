//! Plain-text reply stripping. A smaller cousin of the HTML pipeline.

use std::sync::LazyLock;

use tracing::debug;

use super::{apply_all, compile, is_delivery_failure, CompiledRule, DiscardReason, RewriteRule, Stripped};

/// The plain-text pipeline, in application order.
pub const TEXT_RULES: &[RewriteRule] = &[
    RewriteRule {
        // The attribution often wraps onto a second line
        name: "quote_attribution",
        pattern: r"(?s)On .*? wrote:.*$",
        replacement: "",
    },
    RewriteRule {
        name: "forwarded_marker",
        pattern: r"(?i)Begin forwarded message:",
        replacement: "",
    },
    RewriteRule {
        name: "whitespace_runs",
        pattern: r"\s{2,}",
        replacement: " ",
    },
    RewriteRule {
        name: "header_lines",
        pattern: r"(.+): (.+)\r?\n",
        replacement: "",
    },
    RewriteRule {
        name: "surrounding_whitespace",
        pattern: r"^\s+|\s+$",
        replacement: "",
    },
];

static TEXT_PIPELINE: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(TEXT_RULES));

/// Strip everything but the latest reply out of a `text/plain` body.
pub fn strip_text(input: &[u8]) -> Stripped {
    if is_delivery_failure(input) {
        debug!("Text body is a delivery failure notice");
        return Stripped::Discarded(DiscardReason::DeliveryFailure);
    }
    Stripped::Kept(apply_all(&TEXT_PIPELINE, input))
}
