//! Link-only profile submission to the external profile API.

use findmystage_core::{Error, Result};
use findmystage_ingest::{extract_link, ReferenceLinks};
use findmystage_profile::ParsedProfile;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

const NO_SUMMARY: &str = "No summary available";

#[derive(Debug, Deserialize)]
struct ProfileApiResponse {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    personality: Vec<String>,
}

/// Posts reference links to the profile API when no document text exists.
#[derive(Debug, Clone)]
pub struct LinkSubmitter {
    http: Client,
    url: String,
}

impl LinkSubmitter {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Multipart POST of the non-blank links; blank fields are not sent.
    pub async fn submit(&self, links: &ReferenceLinks) -> Result<ParsedProfile> {
        let mut form = Form::new();
        let mut sent = 0;
        for (channel, url) in links.non_blank() {
            let link = extract_link(channel, url);
            if let Some(id) = &link.video_id {
                debug!("Video link {} has id {}", link.url, id);
            }
            form = form.text(channel.form_field(), link.url);
            sent += 1;
        }
        debug!("Submitting {} reference link(s) to {}", sent, self.url);

        let resp = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Submission(format!("Profile API request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Submission(format!(
                "Profile API returned {}: {}",
                status, body
            )));
        }

        let body: ProfileApiResponse = resp
            .json()
            .await
            .map_err(|e| Error::Submission(format!("Invalid profile API response: {}", e)))?;

        info!(
            "Profile API returned {} topics, {} traits",
            body.topics.len(),
            body.personality.len()
        );
        Ok(ParsedProfile::unattributed(
            body.topics,
            body.personality,
            body.summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
        ))
    }
}
