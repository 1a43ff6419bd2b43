//! Speaker profile types and the per-request state machine.

use findmystage_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which strategy produced a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListTier {
    /// Provider returned a JSON object.
    Structured,
    /// A `label: a, b, c` line.
    Labeled,
    /// Sentences containing a telltale keyword.
    Keyword,
    /// Nothing matched; fixed defaults.
    Default,
}

/// Which strategy produced the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTier {
    Structured,
    Labeled,
    Paragraph,
    Truncated,
}

/// Per-field extraction provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProvenance {
    pub topics: ListTier,
    pub personality: ListTier,
    pub summary: SummaryTier,
}

impl ProfileProvenance {
    /// True when any field fell back to a default or truncation.
    pub fn is_degraded(&self) -> bool {
        self.topics == ListTier::Default
            || self.personality == ListTier::Default
            || self.summary == SummaryTier::Truncated
    }
}

/// Profile fields recovered from one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProfile {
    pub topics: Vec<String>,
    pub personality_traits: Vec<String>,
    pub summary: String,
    /// `None` when the fields came from somewhere other than reply parsing.
    pub provenance: Option<ProfileProvenance>,
}

impl ParsedProfile {
    /// Fields supplied verbatim by an external service.
    pub fn unattributed(topics: Vec<String>, personality_traits: Vec<String>, summary: String) -> Self {
        Self {
            topics,
            personality_traits,
            summary,
            provenance: None,
        }
    }
}

/// Lifecycle of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProfileState {
    Loading,
    Ready,
    Failed { reason: String },
}

/// The profile displayed for one analysis request.
///
/// Starts in `Loading` with empty fields and moves exactly once to `Ready`
/// or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    #[serde(rename = "requestId")]
    pub request_id: u64,
    pub topics: Vec<String>,
    #[serde(rename = "personality")]
    pub personality_traits: Vec<String>,
    pub summary: String,
    pub state: ProfileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProfileProvenance>,
}

impl SpeakerProfile {
    pub fn loading(request_id: u64) -> Self {
        Self {
            request_id,
            topics: Vec::new(),
            personality_traits: Vec::new(),
            summary: String::new(),
            state: ProfileState::Loading,
            provenance: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == ProfileState::Loading
    }

    /// `Loading → Ready`.
    pub fn complete(&mut self, parsed: ParsedProfile) -> Result<()> {
        self.ensure_loading("ready")?;
        self.topics = parsed.topics;
        self.personality_traits = parsed.personality_traits;
        self.summary = parsed.summary;
        self.provenance = parsed.provenance;
        self.state = ProfileState::Ready;
        Ok(())
    }

    /// `Loading → Failed`. Fields stay empty.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_loading("failed")?;
        self.state = ProfileState::Failed {
            reason: reason.into(),
        };
        Ok(())
    }

    fn ensure_loading(&self, target: &str) -> Result<()> {
        if self.is_loading() {
            Ok(())
        } else {
            Err(Error::InvalidTransition(format!(
                "request {} is already {:?}, cannot become {}",
                self.request_id, self.state, target
            )))
        }
    }
}
