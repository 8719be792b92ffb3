//! HTML reply stripping.
//!
//! Different mail clients encode replies in their own ways and no rule set
//! covers all of them. The table below is tuned against the markup of the
//! common clients (Outlook/Word, Gmail, Apple Mail, mobile clients).

use std::sync::LazyLock;

use tracing::debug;

use crate::extract::{content_digest, to_hex};
use super::snapshot::SnapshotDir;
use super::{apply_all, compile, is_delivery_failure, CompiledRule, DiscardReason, RewriteRule, Stripped};

/// The HTML pipeline, in application order.
///
/// Everything after `line_breaks` operates on a single logical line.
pub const HTML_RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "document_head",
        pattern: r"(?is)<html.*?</head>",
        replacement: "",
    },
    RewriteRule {
        // Outlook's "From:/Sent:/To:" block under a top border
        name: "outlook_reply_header",
        pattern: r#"<div style="border-top:solid[^>]*?><p[^>]*?><strong><span[^>]*>[A-Za-z]+:.*"#,
        replacement: "",
    },
    RewriteRule {
        name: "xml_namespaces",
        pattern: r#" ?xmlns(:[a-z]+)?="[^"]*""#,
        replacement: "",
    },
    RewriteRule {
        name: "line_breaks",
        pattern: r"[\r\n]+",
        replacement: "",
    },
    RewriteRule {
        name: "quote_attribution",
        pattern: r"On .*? wrote:.*",
        replacement: "",
    },
    RewriteRule {
        name: "conditional_comments",
        pattern: r"<!--\[if.*?endif\]-->",
        replacement: "",
    },
    RewriteRule {
        name: "comments",
        pattern: r"<!--.*?-->",
        replacement: "",
    },
    RewriteRule {
        name: "forwarded_marker",
        pattern: r"Begin forwarded message:",
        replacement: "",
    },
    RewriteRule {
        name: "nbsp",
        pattern: r"&nbsp;?",
        replacement: "",
    },
    RewriteRule {
        name: "style_and_meta",
        pattern: r"(?i)<style[^>]*>.*?</style>|<meta[^>]*/>|<meta[^>]*>.*?</meta>",
        replacement: "",
    },
    RewriteRule {
        name: "div_tags",
        pattern: r"(?i)</?div[^>]*>",
        replacement: "",
    },
    RewriteRule {
        name: "office_paragraphs",
        pattern: r"(?i)<o:p[^>]*>[^>]*</o:p>",
        replacement: "",
    },
    RewriteRule {
        name: "style_and_class_attributes",
        pattern: r#"(?i) ?(style|class)="[^"]*""#,
        replacement: "",
    },
    RewriteRule {
        name: "bold_header_lines",
        pattern: r"(?i)(<blockquote[^>]*>)?<(strong|b)>[^:]*: ?</(strong|b)> ?[^<]+<br/?>",
        replacement: "",
    },
    RewriteRule {
        name: "nowrap_attributes",
        pattern: r#" ?nowrap="[^"]*""#,
        replacement: "",
    },
    RewriteRule {
        name: "bare_spans",
        pattern: r"<span>(.*?)</span>",
        replacement: "${1}",
    },
    RewriteRule {
        // cid: and data: images cannot be shown in chat
        name: "local_images",
        pattern: r#"(?i)<img[^>]*?src="[^h"][^>]*>"#,
        replacement: "",
    },
    RewriteRule {
        name: "repeated_breaks",
        pattern: r"(?i)(<br[^>]*>){2,}",
        replacement: "<br>",
    },
    RewriteRule {
        name: "table_cell_paragraphs",
        pattern: r"<td([^>]*)><p[^>]*>(.*?)</p></td>",
        replacement: "<td${1}>${2}</td>",
    },
    RewriteRule {
        // Four or more empty paragraphs in a row: the real content is over
        name: "empty_paragraph_run",
        pattern: r"(?i)(<p></p>){4,}.*",
        replacement: "",
    },
    RewriteRule {
        name: "empty_paragraphs",
        pattern: r"(?i)<p></p>",
        replacement: "",
    },
    RewriteRule {
        name: "trailing_blockquote",
        pattern: r"(?i)<blockquote[^>]*>$",
        replacement: "",
    },
    RewriteRule {
        name: "mobile_signature",
        pattern: r"(Sent [Ff]rom|Sent via).*",
        replacement: "",
    },
];

static HTML_PIPELINE: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(HTML_RULES));

/// Strip everything but the latest reply out of an HTML body.
///
/// Bounce notices are [`Stripped::Discarded`]. When `snapshots` is set, the
/// input and output are captured for offline tuning.
pub fn strip_html(input: &[u8], snapshots: Option<&SnapshotDir>) -> Stripped {
    let digest = snapshots.map(|dir| {
        let digest = to_hex(&content_digest(input));
        dir.capture(&digest, "in", input);
        digest
    });

    if is_delivery_failure(input) {
        debug!("HTML body is a delivery failure notice");
        return Stripped::Discarded(DiscardReason::DeliveryFailure);
    }

    let output = apply_all(&HTML_PIPELINE, input);

    if let (Some(dir), Some(digest)) = (snapshots, digest) {
        dir.capture(&digest, "out", &output);
    }

    Stripped::Kept(output)
}
