//! Topic extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::sections::ListRecipe;
use crate::types::ListTier;

pub const DEFAULT_TOPICS: &[&str] = &["Leadership", "Communication", "Industry Expertise"];

static TOPIC_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:topics|areas of expertise|specializes in):").expect("valid regex")
});

const TOPIC_KEYWORDS: &[&str] = &["expert", "specialist", "focus on", "specialized in"];

static RECIPE: ListRecipe = ListRecipe {
    label: &TOPIC_LABEL,
    keywords: TOPIC_KEYWORDS,
    defaults: DEFAULT_TOPICS,
};

/// Topics a speaker covers, with the tier that produced them.
pub fn extract_topics_with_tier(reply: &str) -> (Vec<String>, ListTier) {
    RECIPE.extract(reply)
}

/// Topics a speaker covers. Never empty.
pub fn extract_topics(reply: &str) -> Vec<String> {
    extract_topics_with_tier(reply).0
}
