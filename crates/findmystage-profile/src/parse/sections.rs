//! Two-tier list recovery shared by the topic and personality extractors.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ListTier;

/// A period that ends a sentence (followed by whitespace or end of text).
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:\s|$)").expect("valid regex"));

/// Item separators inside a labeled section.
static ITEM_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",|\sand\s").expect("valid regex"));

/// Fragment boundaries for the keyword scan.
static FRAGMENT_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,\n]").expect("valid regex"));

/// Labels, keywords and defaults for one list field.
pub struct ListRecipe {
    /// Case-insensitive alternation of `label:` patterns.
    pub label: &'static Lazy<Regex>,
    /// Lowercase keywords that flag a fragment as relevant.
    pub keywords: &'static [&'static str],
    pub defaults: &'static [&'static str],
}

impl ListRecipe {
    /// Labeled section, then keyword fragments, then defaults. Never empty.
    pub fn extract(&self, reply: &str) -> (Vec<String>, ListTier) {
        if let Some(items) = labeled_items(self.label, reply) {
            return (items, ListTier::Labeled);
        }
        let fragments = keyword_fragments(reply, self.keywords);
        if !fragments.is_empty() {
            return (fragments, ListTier::Keyword);
        }
        (
            self.defaults.iter().map(|s| s.to_string()).collect(),
            ListTier::Default,
        )
    }
}

/// Items of the first `label: ...` section, or `None` when there is no label
/// or the section holds no items.
///
/// The section runs to the end of its line or to the first sentence end,
/// whichever comes first, so `Topics: a, b. Personality: c` yields `[a, b]`.
pub fn labeled_items(label: &Regex, reply: &str) -> Option<Vec<String>> {
    let found = label.find(reply)?;
    let rest = &reply[found.end()..];
    let line = rest.split('\n').next().unwrap_or("");
    let section = match SENTENCE_END.find(line) {
        Some(end) => &line[..end.start()],
        None => line,
    };

    let items: Vec<String> = ITEM_SEPARATOR
        .split(section)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Trimmed fragments (split on periods, commas and newlines) that mention
/// any of the keywords, in reply order.
pub fn keyword_fragments(reply: &str, keywords: &[&str]) -> Vec<String> {
    FRAGMENT_BOUNDARY
        .split(reply)
        .filter(|fragment| {
            let lower = fragment.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.to_string())
        .collect()
}
