//! Analyzer: coordinates extraction, synthesis and link submission.

use chrono::Utc;
use findmystage_chat::LLMConfig;
use findmystage_core::{Error, Result};
use findmystage_ingest::{content_fingerprint, extract_document, ProfileInput};
use findmystage_profile::Synthesizer;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::board::{Outcome, ProfileBoard, Settlement};
use crate::submit::LinkSubmitter;
use crate::types::*;

/// Drives one analysis from input to profile.
#[derive(Debug, Clone)]
pub struct Analyzer {
    synthesizer: Option<Synthesizer>,
    submitter: LinkSubmitter,
}

impl Analyzer {
    pub fn new(synthesizer: Option<Synthesizer>, submitter: LinkSubmitter) -> Self {
        Self {
            synthesizer,
            submitter,
        }
    }

    /// Build from the current LLM config. The synthesizer is absent when no
    /// provider key is configured.
    pub fn from_config(llm: &LLMConfig, http: &Client, profile_api_url: &str) -> Self {
        let synthesizer = llm
            .completion_client(http)
            .map(|client| Synthesizer::new(client, llm.completion_options()));
        Self::new(synthesizer, LinkSubmitter::new(http.clone(), profile_api_url))
    }

    pub fn has_synthesizer(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Analyze one input without touching any displayed state.
    ///
    /// Extraction failure is fatal. Non-empty text goes to the synthesizer;
    /// an absent document or blank text goes to the profile API instead.
    pub async fn analyze(&self, input: ProfileInput) -> Result<Analysis> {
        let text = match input.document {
            Some(document) => {
                let filename = document.filename().unwrap_or("document").to_string();
                let text = tokio::task::spawn_blocking(move || extract_document(&document))
                    .await
                    .map_err(|e| Error::Internal(format!("Extraction task failed: {}", e)))??;
                debug!("Extracted {} chars from {}", text.as_str().len(), filename);
                Some(text)
            }
            None => None,
        };

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            let synthesizer = self
                .synthesizer
                .as_ref()
                .ok_or_else(|| Error::Synthesis("No LLM provider configured".into()))?;
            let parsed = synthesizer.synthesize(text.as_str()).await?;
            return Ok(Analysis {
                path: AnalysisPath::Synthesized,
                parsed,
            });
        }

        info!("No document text; submitting reference links to {}", self.submitter.url());
        let parsed = self.submitter.submit(&input.reference_links).await?;
        Ok(Analysis {
            path: AnalysisPath::LinkSubmission,
            parsed,
        })
    }

    /// Validate, begin a request on `board`, analyze, and settle.
    ///
    /// Analysis errors become a `Failed` profile with a fixed reason; only
    /// invalid input and board misuse are returned as errors.
    pub async fn run(&self, board: &ProfileBoard, input: ProfileInput) -> Result<AnalysisReport> {
        input.validate()?;
        let fingerprint = input.document.as_ref().map(|d| content_fingerprint(d.bytes()));

        let started_at = Utc::now();
        let request_id = board.begin();
        info!("Analysis request {} started", request_id);

        let (outcome, path, notice) = match self.analyze(input).await {
            Ok(analysis) => (
                Outcome::Ready(analysis.parsed),
                Some(analysis.path),
                Notice::completed(analysis.path),
            ),
            Err(e) => {
                error!("Analysis request {} failed: {}", request_id, e);
                let (notice, reason) = Notice::failed(&e);
                (Outcome::Failed(reason.to_string()), None, notice)
            }
        };

        let (settlement, profile) = board.settle(request_id, outcome)?;
        let finished_at = Utc::now();
        info!(
            "Analysis request {} settled in {}ms ({:?})",
            request_id,
            (finished_at - started_at).num_milliseconds(),
            settlement
        );

        Ok(AnalysisReport {
            request_id,
            applied: settlement == Settlement::Applied,
            path,
            profile,
            notice,
            fingerprint,
            started_at,
            finished_at,
        })
    }
}
