//! Summary extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::SummaryTier;

/// Paragraphs shorter than this are skipped by the paragraph fallback.
const MIN_PARAGRAPH_CHARS: usize = 50;
/// Characters kept by the truncation fallback.
const TRUNCATE_CHARS: usize = 200;

static SUMMARY_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)summary:").expect("valid regex"));

/// A labeled summary ends at a blank line or at a line starting with a capital.
/// Line ends may be `\n` or `\r\n`.
static SUMMARY_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n\r?\n|\r?\n[A-Z]").expect("valid regex"));

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r?\n){2,}").expect("valid regex"));

/// Prose summary with the tier that produced it. Never empty.
pub fn extract_summary_with_tier(reply: &str) -> (String, SummaryTier) {
    if let Some(summary) = labeled_summary(reply) {
        return (summary, SummaryTier::Labeled);
    }

    if let Some(paragraph) = PARAGRAPH_BREAK
        .split(reply)
        .map(str::trim)
        .find(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
    {
        return (paragraph.to_string(), SummaryTier::Paragraph);
    }

    let head: String = reply.chars().take(TRUNCATE_CHARS).collect();
    (format!("{}...", head.trim()), SummaryTier::Truncated)
}

/// Prose summary. Never empty, even for an empty reply.
pub fn extract_summary(reply: &str) -> String {
    extract_summary_with_tier(reply).0
}

fn labeled_summary(reply: &str) -> Option<String> {
    let label = SUMMARY_LABEL.find(reply)?;
    let rest = &reply[label.end()..];
    let body = match SUMMARY_END.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    };
    let body = body.trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}
