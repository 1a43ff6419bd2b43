//! API parity tests: response shapes the browser client depends on.
//!
//! These serialize the real response types and check field names and JSON
//! types, without starting a server.

use chrono::Utc;
use findmystage_chat::LLMConfig;
use findmystage_profile::{parse_reply, SpeakerProfile};
use findmystage_runtime::{AnalysisPath, AnalysisReport, Notice};

/// Profile shape: { requestId, topics[], personality[], summary, state: { status } }
#[test]
fn test_loading_profile_shape() {
    let json = serde_json::to_value(SpeakerProfile::loading(3)).unwrap();

    assert_eq!(json["requestId"], 3);
    assert!(json["topics"].as_array().unwrap().is_empty());
    assert!(json["personality"].as_array().unwrap().is_empty());
    assert_eq!(json["summary"], "");
    assert_eq!(json["state"]["status"], "loading");
    assert!(json.get("provenance").is_none());
}

/// Failed profiles carry the reason next to the status tag.
#[test]
fn test_failed_profile_shape() {
    let mut profile = SpeakerProfile::loading(1);
    profile.fail("Failed to analyze content. Please try again.").unwrap();
    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["state"]["status"], "failed");
    assert!(json["state"]["reason"].is_string());
}

/// Ready profiles expose per-field provenance.
#[test]
fn test_ready_profile_provenance_shape() {
    let mut profile = SpeakerProfile::loading(1);
    profile
        .complete(parse_reply("Topics: Growth. Personality: Curious."))
        .unwrap();
    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["state"]["status"], "ready");
    assert_eq!(json["provenance"]["topics"], "labeled");
    assert_eq!(json["provenance"]["personality"], "labeled");
    assert!(json["provenance"]["summary"].is_string());
}

/// Report shape returned by POST /api/profiles/analyze.
#[test]
fn test_report_shape() {
    let now = Utc::now();
    let report = AnalysisReport {
        request_id: 7,
        applied: true,
        path: Some(AnalysisPath::LinkSubmission),
        profile: SpeakerProfile::loading(7),
        notice: Notice::completed(AnalysisPath::LinkSubmission),
        fingerprint: None,
        started_at: now,
        finished_at: now,
    };
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["requestId"], 7);
    assert!(json["applied"].is_boolean());
    assert_eq!(json["path"], "link_submission");
    assert!(json["profile"].is_object());
    assert!(json["notice"]["title"].is_string());
    assert!(json["notice"]["description"].is_string());
    assert_eq!(json["notice"]["variant"], "success");
    assert!(json.get("fingerprint").is_none());
    assert!(json["startedAt"].is_string());
    assert!(json["finishedAt"].is_string());
}

/// LLM config response: keys reported as booleans only.
#[test]
fn test_llm_config_response_shape() {
    let config = LLMConfig {
        anthropic_api_key: Some("sk-ant-secret".into()),
        ..Default::default()
    };
    let json = serde_json::to_value(config.to_response()).unwrap();

    assert_eq!(json["preferredProvider"], "auto");
    assert_eq!(json["anthropicConfigured"], true);
    assert_eq!(json["openaiConfigured"], false);
    assert_eq!(json["activeProvider"], "anthropic");
    assert!(json["temperature"].is_number());
    assert_eq!(json["structuredOutput"], false);
    assert!(!json.to_string().contains("sk-ant-secret"));
}
