//! Personality trait extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::sections::ListRecipe;
use crate::types::ListTier;

pub const DEFAULT_TRAITS: &[&str] = &["Passionate", "Insightful", "Engaging", "Authoritative"];

static PERSONALITY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:personality|characterized by|traits):").expect("valid regex")
});

const PERSONALITY_KEYWORDS: &[&str] = &["passionate", "driven", "enthusiastic", "dynamic"];

static RECIPE: ListRecipe = ListRecipe {
    label: &PERSONALITY_LABEL,
    keywords: PERSONALITY_KEYWORDS,
    defaults: DEFAULT_TRAITS,
};

/// Personality traits, with the tier that produced them.
pub fn extract_personality_with_tier(reply: &str) -> (Vec<String>, ListTier) {
    RECIPE.extract(reply)
}

/// Personality traits. Never empty.
pub fn extract_personality(reply: &str) -> Vec<String> {
    extract_personality_with_tier(reply).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personality_label() {
        let reply = "Summary: something\nPersonality: curious, warm and direct\n";
        assert_eq!(extract_personality(reply), vec!["curious", "warm", "direct"]);
    }

    #[test]
    fn test_personality_traits_label_variant() {
        let reply = "Her personality traits: calm, precise";
        assert_eq!(extract_personality(reply), vec!["calm", "precise"]);
    }

    #[test]
    fn test_characterized_by_label() {
        let (traits, tier) = extract_personality_with_tier("I am characterized by: grit and humor.");
        assert_eq!(traits, vec!["grit", "humor"]);
        assert_eq!(tier, ListTier::Labeled);
    }

    #[test]
    fn test_keyword_fallback() {
        let reply = "A Driven founder, and a thoughtful listener.\nEnthusiastic on stage.";
        let (traits, tier) = extract_personality_with_tier(reply);
        assert_eq!(traits, vec!["A Driven founder", "Enthusiastic on stage"]);
        assert_eq!(tier, ListTier::Keyword);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            extract_personality("Nothing to see."),
            vec!["Passionate", "Insightful", "Engaging", "Authoritative"]
        );
    }
}
