//! Reply parsing: structured JSON first, then labeled sections, keyword
//! sentences and fixed defaults.

pub mod personality;
pub mod sections;
pub mod structured;
pub mod summary;
pub mod topics;

use tracing::{debug, warn};

use crate::types::{ListTier, ParsedProfile, ProfileProvenance, SummaryTier};

pub use personality::{extract_personality, DEFAULT_TRAITS};
pub use structured::StructuredReply;
pub use summary::extract_summary;
pub use topics::{extract_topics, DEFAULT_TOPICS};

/// Recover every profile field from one completion reply.
///
/// The three fields are extracted independently; every field of the result
/// is non-empty. Accuracy is not guaranteed, so the provenance records which
/// tier produced each field.
pub fn parse_reply(reply: &str) -> ParsedProfile {
    let structured = StructuredReply::parse(reply).unwrap_or_default();

    let (topics, topics_tier) = if structured.topics.is_empty() {
        topics::extract_topics_with_tier(reply)
    } else {
        (structured.topics, ListTier::Structured)
    };

    let (personality_traits, personality_tier) = if structured.personality.is_empty() {
        personality::extract_personality_with_tier(reply)
    } else {
        (structured.personality, ListTier::Structured)
    };

    let (summary, summary_tier) = match structured.summary {
        Some(summary) => (summary, SummaryTier::Structured),
        None => summary::extract_summary_with_tier(reply),
    };

    let provenance = ProfileProvenance {
        topics: topics_tier,
        personality: personality_tier,
        summary: summary_tier,
    };

    if provenance.is_degraded() {
        warn!(
            "Reply parsing fell back to defaults: topics={:?} personality={:?} summary={:?}",
            topics_tier, personality_tier, summary_tier
        );
    } else {
        debug!("Reply parsed: {:?}", provenance);
    }

    ParsedProfile {
        topics,
        personality_traits,
        summary,
        provenance: Some(provenance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_labeled_reply() {
        let parsed = parse_reply("Topics: AI Ethics, Climate Policy. Personality: Analytical, Bold.");
        assert_eq!(parsed.topics, vec!["AI Ethics", "Climate Policy"]);
        assert_eq!(parsed.personality_traits, vec!["Analytical", "Bold"]);
        assert!(!parsed.summary.is_empty());
        let provenance = parsed.provenance.unwrap();
        assert_eq!(provenance.topics, ListTier::Labeled);
        assert_eq!(provenance.personality, ListTier::Labeled);
    }

    #[test]
    fn test_fields_extracted_independently_of_order() {
        let reply = "Personality: warm, direct\nSummary: I coach founders.\n\nTopics: fundraising and hiring";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.topics, vec!["fundraising", "hiring"]);
        assert_eq!(parsed.personality_traits, vec!["warm", "direct"]);
        assert_eq!(parsed.summary, "I coach founders.");
    }

    #[test]
    fn test_unstructured_reply_gets_defaults_everywhere() {
        let parsed = parse_reply("ok");
        assert_eq!(parsed.topics, DEFAULT_TOPICS);
        assert_eq!(parsed.personality_traits, DEFAULT_TRAITS);
        assert_eq!(parsed.summary, "ok...");
        assert!(parsed.provenance.unwrap().is_degraded());
    }

    #[test]
    fn test_structured_reply_preferred_per_field() {
        let reply = r#"{"topics": ["Negotiation"], "personality": [], "summary": "I close deals."}"#;
        let parsed = parse_reply(reply);
        assert_eq!(parsed.topics, vec!["Negotiation"]);
        assert_eq!(parsed.summary, "I close deals.");
        // No traits in the object and no prose to mine either.
        assert_eq!(parsed.personality_traits, DEFAULT_TRAITS);
        let provenance = parsed.provenance.unwrap();
        assert_eq!(provenance.topics, ListTier::Structured);
        assert_eq!(provenance.personality, ListTier::Default);
        assert_eq!(provenance.summary, SummaryTier::Structured);
    }

    #[test]
    fn test_every_field_non_empty_for_odd_replies() {
        for reply in ["", "\n\n\n", "topics:", "Summary:", "....", "{}", "```"] {
            let parsed = parse_reply(reply);
            assert!(!parsed.topics.is_empty(), "topics empty for {reply:?}");
            assert!(!parsed.personality_traits.is_empty(), "traits empty for {reply:?}");
            assert!(!parsed.summary.is_empty(), "summary empty for {reply:?}");
        }
    }
}
