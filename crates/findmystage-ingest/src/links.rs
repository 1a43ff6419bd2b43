//! Reference links supplied alongside (or instead of) a document.
//!
//! Links are never fetched. They pass through to the link-only profile API
//! unchanged; video links additionally get their video id recovered when the
//! URL shape is recognised.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fixed set of reference channels a speaker can link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceChannel {
    Video,
    Website,
    ProfessionalNetwork,
    Book,
}

impl ReferenceChannel {
    pub const ALL: [ReferenceChannel; 4] = [
        Self::Video,
        Self::Website,
        Self::ProfessionalNetwork,
        Self::Book,
    ];

    /// Multipart form field carrying this channel's URL.
    pub fn form_field(&self) -> &'static str {
        match self {
            Self::Video => "youtubeUrl",
            Self::Website => "websiteUrl",
            Self::ProfessionalNetwork => "linkedinUrl",
            Self::Book => "bookUrl",
        }
    }

    pub fn from_form_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.form_field() == field)
    }
}

impl std::fmt::Display for ReferenceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Website => write!(f, "website"),
            Self::ProfessionalNetwork => write!(f, "professional_network"),
            Self::Book => write!(f, "book"),
        }
    }
}

/// Channel → URL map. URLs are stored as given; no well-formedness check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLinks(BTreeMap<ReferenceChannel, String>);

impl ReferenceLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, channel: ReferenceChannel, url: impl Into<String>) {
        self.0.insert(channel, url.into());
    }

    pub fn with(mut self, channel: ReferenceChannel, url: impl Into<String>) -> Self {
        self.set(channel, url);
        self
    }

    pub fn get(&self, channel: ReferenceChannel) -> Option<&str> {
        self.0.get(&channel).map(|s| s.as_str())
    }

    /// Links whose URL is not blank, in channel order.
    pub fn non_blank(&self) -> impl Iterator<Item = (ReferenceChannel, &str)> {
        self.0
            .iter()
            .map(|(c, u)| (*c, u.trim()))
            .filter(|(_, u)| !u.is_empty())
    }

    pub fn has_any(&self) -> bool {
        self.non_blank().next().is_some()
    }
}

/// Result of "extracting" a link: the URL itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkExtraction {
    pub channel: ReferenceChannel,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

static SHORT_VIDEO_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtu\.be/([^?&/#]+)").expect("valid regex"));
static WATCH_VIDEO_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]v=([^&#]+)").expect("valid regex"));

/// Pass a link through without fetching it.
pub fn extract_link(channel: ReferenceChannel, url: &str) -> LinkExtraction {
    let video_id = match channel {
        ReferenceChannel::Video => video_id(url),
        _ => None,
    };
    LinkExtraction {
        channel,
        url: url.to_string(),
        video_id,
    }
}

/// Recover a video id from `youtu.be/<id>` or `youtube.com/...?v=<id>` URLs.
pub fn video_id(url: &str) -> Option<String> {
    if url.contains("youtu.be") {
        return SHORT_VIDEO_URL
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
    }
    if url.contains("youtube.com") {
        return WATCH_VIDEO_PARAM
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
    }
    None
}
