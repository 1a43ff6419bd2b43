//! JSON replies from providers asked for structured output.

use serde::Deserialize;

/// Shape requested from the model in structured mode. Every field optional so
/// a partially conforming reply still contributes what it has.
#[derive(Debug, Default, Deserialize)]
pub struct StructuredReply {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, alias = "personalityTraits", alias = "traits")]
    pub personality: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl StructuredReply {
    /// Parse a reply that is a JSON object, optionally inside a fenced block.
    /// Returns `None` for prose.
    pub fn parse(reply: &str) -> Option<Self> {
        let body = strip_code_fence(reply.trim());
        if !body.starts_with('{') {
            return None;
        }
        let mut parsed: StructuredReply = serde_json::from_str(body).ok()?;
        parsed.topics = clean(parsed.topics);
        parsed.personality = clean(parsed.personality);
        parsed.summary = parsed
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Some(parsed)
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence.
    let inner = match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => inner,
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
