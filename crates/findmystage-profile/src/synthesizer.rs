//! Profile synthesis: one completion call, then reply parsing.

use findmystage_chat::{CompletionClient, CompletionOptions};
use findmystage_core::{Error, Result};
use tracing::{debug, info};

use crate::parse::parse_reply;
use crate::prompt::build_messages;
use crate::types::ParsedProfile;

/// Sends extracted text to the completion endpoint and parses the reply.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    client: CompletionClient,
    options: CompletionOptions,
}

impl Synthesizer {
    pub fn new(client: CompletionClient, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Step A: a single completion request for `text`. No retry, no
    /// chunking, no length check.
    pub async fn request_reply(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Synthesis requires non-empty text".into()));
        }
        let messages = build_messages(text, self.options.json_response);
        debug!(
            "Synthesizing profile from {} chars with {} ({})",
            text.len(),
            self.client.model(),
            self.client.provider()
        );
        self.client.complete(&messages, &self.options).await
    }

    /// Steps A and B: request a reply and recover the profile fields from it.
    pub async fn synthesize(&self, text: &str) -> Result<ParsedProfile> {
        let reply = self.request_reply(text).await?;
        info!("Completion reply received ({} chars)", reply.len());
        Ok(parse_reply(&reply))
    }
}
