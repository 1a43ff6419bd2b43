//! Runtime types.

use chrono::{DateTime, Utc};
use findmystage_core::Error;
use findmystage_profile::{ParsedProfile, SpeakerProfile};
use serde::Serialize;

/// Which route produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPath {
    /// Document text analyzed by the completion endpoint.
    Synthesized,
    /// No usable text; links posted to the profile API.
    LinkSubmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Destructive,
}

/// Transient user-facing notification accompanying a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    fn new(title: &str, description: &str, variant: NoticeVariant) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant,
        }
    }

    pub fn completed(path: AnalysisPath) -> Self {
        let description = match path {
            AnalysisPath::Synthesized => "Speaker profile has been generated successfully",
            AnalysisPath::LinkSubmission => "Speaker profile has been generated from provided URLs",
        };
        Self::new("Analysis Complete", description, NoticeVariant::Success)
    }

    /// Notification and fixed profile reason for a failed analysis.
    pub fn failed(err: &Error) -> (Self, &'static str) {
        match err {
            Error::Extraction(_) => (
                Self::new(
                    "PDF Processing Error",
                    "Failed to extract text from the PDF document",
                    NoticeVariant::Destructive,
                ),
                "Failed to extract text from the PDF document.",
            ),
            Error::Synthesis(_) => (
                Self::new(
                    "AI Analysis Failed",
                    "Error processing your content with AI",
                    NoticeVariant::Destructive,
                ),
                "Failed to analyze content with AI. Please try again.",
            ),
            _ => (
                Self::new(
                    "Analysis Failed",
                    "There was an error analyzing your content",
                    NoticeVariant::Destructive,
                ),
                "Failed to analyze content. Please try again.",
            ),
        }
    }
}

/// Successful outcome of one analysis, before it reaches the board.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub path: AnalysisPath,
    pub parsed: ParsedProfile,
}

/// What the caller gets back from a full run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    #[serde(rename = "requestId")]
    pub request_id: u64,
    /// False when a newer request had started before this one settled.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<AnalysisPath>,
    /// This request's own profile, whether or not it is displayed.
    pub profile: SpeakerProfile,
    pub notice: Notice,
    /// SHA-256 of the submitted document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "finishedAt")]
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reasons_by_error_kind() {
        let (notice, reason) = Notice::failed(&Error::Synthesis("timeout".into()));
        assert_eq!(notice.title, "AI Analysis Failed");
        assert_eq!(reason, "Failed to analyze content with AI. Please try again.");

        let (notice, _) = Notice::failed(&Error::Extraction("bad xref".into()));
        assert_eq!(notice.title, "PDF Processing Error");

        let (notice, reason) = Notice::failed(&Error::Submission("503".into()));
        assert_eq!(notice.variant, NoticeVariant::Destructive);
        assert_eq!(reason, "Failed to analyze content. Please try again.");
    }

    #[test]
    fn test_completed_notice_serializes_lowercase_variant() {
        let json = serde_json::to_value(Notice::completed(AnalysisPath::LinkSubmission)).unwrap();
        assert_eq!(json["variant"], "success");
        assert_eq!(json["title"], "Analysis Complete");
    }
}
