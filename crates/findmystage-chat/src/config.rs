//! LLM configuration persistence and provider selection.

use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::providers::{CompletionClient, CompletionOptions};
use crate::types::{LLMConfigResponse, LLMConfigUpdate, LLMProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Moderately creative; profile prose benefits from some variety.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"];
pub const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-20250514",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
];
pub const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "mixtral-8x7b-32768",
];

/// Stored LLM configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Ask the provider for a JSON object instead of prose.
    #[serde(default)]
    pub structured_output: bool,
    /// Overrides the provider's API root (proxies, tests).
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Path to config file for saving.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            structured_output: false,
            api_base_url: None,
            config_path: PathBuf::new(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = match std::fs::read_to_string(config_path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring unreadable {}: {}", config_path.display(), e);
                LLMConfig::default()
            }),
            Err(_) => LLMConfig::default(),
        };

        config.config_path = config_path.to_path_buf();

        // Env vars as fallback for API keys
        if config.openai_api_key.is_none() {
            config.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = std::env::var("GROQ_API_KEY").ok();
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> findmystage_core::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Apply an update, merging with existing config.
    pub fn apply_update(&mut self, update: &LLMConfigUpdate) {
        if let Some(p) = &update.preferred_provider {
            self.preferred_provider = p.clone();
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = Some(k.clone());
        }
        if let Some(k) = &update.anthropic_api_key {
            self.anthropic_api_key = Some(k.clone());
        }
        if let Some(k) = &update.groq_api_key {
            self.groq_api_key = Some(k.clone());
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
        if let Some(t) = update.temperature {
            self.temperature = t.clamp(0.0, 2.0);
        }
        if let Some(s) = update.structured_output {
            self.structured_output = s;
        }
    }

    /// Resolve which provider and model to use.
    ///
    /// An explicit preference wins when its key is set. Otherwise, and for
    /// unknown preferences, the first keyed provider in OpenAI > Anthropic >
    /// Groq order is used.
    pub fn resolve_provider(&self) -> Option<(LLMProvider, String, String)> {
        if self.preferred_provider != "auto" {
            match LLMProvider::parse(&self.preferred_provider) {
                Some(preferred) => {
                    if let Some(resolved) = self.keyed(preferred) {
                        return Some(resolved);
                    }
                    debug!(
                        "Preferred provider {} has no API key, falling back to auto order",
                        preferred
                    );
                }
                None => debug!(
                    "Unknown preferred provider '{}', using auto order",
                    self.preferred_provider
                ),
            }
        }

        [LLMProvider::OpenAI, LLMProvider::Anthropic, LLMProvider::Groq]
            .into_iter()
            .find_map(|provider| self.keyed(provider))
    }

    fn keyed(&self, provider: LLMProvider) -> Option<(LLMProvider, String, String)> {
        let (key, model) = match provider {
            LLMProvider::OpenAI => (&self.openai_api_key, &self.openai_model),
            LLMProvider::Anthropic => (&self.anthropic_api_key, &self.anthropic_model),
            LLMProvider::Groq => (&self.groq_api_key, &self.groq_model),
        };
        key.as_ref().map(|k| (provider, model.clone(), k.clone()))
    }

    /// Build a completion client for the resolved provider, if any.
    pub fn completion_client(&self, http: &Client) -> Option<CompletionClient> {
        let (provider, model, api_key) = self.resolve_provider()?;
        let client = CompletionClient::new(http.clone(), provider, model, api_key);
        Some(match &self.api_base_url {
            Some(url) => client.with_base_url(url),
            None => client,
        })
    }

    /// Request options derived from this config.
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            json_response: self.structured_output,
            ..Default::default()
        }
    }

    /// Build the public config response (no API keys exposed).
    pub fn to_response(&self) -> LLMConfigResponse {
        let resolved = self.resolve_provider();
        LLMConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
            groq_configured: self.groq_api_key.is_some(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
            temperature: self.temperature,
            structured_output: self.structured_output,
            active_provider: resolved.map(|(p, _, _)| p.to_string()),
        }
    }

    /// Get available models for the active provider.
    pub fn available_models(&self) -> Vec<String> {
        match self.resolve_provider() {
            Some((LLMProvider::OpenAI, _, _)) => OPENAI_MODELS.iter().map(|s| s.to_string()).collect(),
            Some((LLMProvider::Anthropic, _, _)) => {
                ANTHROPIC_MODELS.iter().map(|s| s.to_string()).collect()
            }
            Some((LLMProvider::Groq, _, _)) => GROQ_MODELS.iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> LLMConfig {
        LLMConfig {
            openai_api_key: Some("sk-openai".into()),
            groq_api_key: Some("gsk-groq".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_prefers_openai() {
        let (provider, model, key) = keyed().resolve_provider().unwrap();
        assert_eq!(provider, LLMProvider::OpenAI);
        assert_eq!(model, DEFAULT_OPENAI_MODEL);
        assert_eq!(key, "sk-openai");
    }

    #[test]
    fn test_explicit_preference_with_key_wins() {
        let mut config = keyed();
        config.preferred_provider = "groq".into();
        let (provider, _, key) = config.resolve_provider().unwrap();
        assert_eq!(provider, LLMProvider::Groq);
        assert_eq!(key, "gsk-groq");
    }

    #[test]
    fn test_preference_without_key_falls_back_to_auto_order() {
        let mut config = keyed();
        config.preferred_provider = "anthropic".into();
        assert_eq!(config.resolve_provider().unwrap().0, LLMProvider::OpenAI);
        assert_eq!(
            config.to_response().active_provider.as_deref(),
            Some("openai")
        );

        config.openai_api_key = None;
        assert_eq!(config.resolve_provider().unwrap().0, LLMProvider::Groq);

        config.preferred_provider = "mystery".into();
        assert_eq!(config.resolve_provider().unwrap().0, LLMProvider::Groq);
    }

    #[test]
    fn test_no_keys_resolves_none() {
        let config = LLMConfig {
            preferred_provider: "openai".into(),
            ..Default::default()
        };
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_response_masks_keys() {
        let json = serde_json::to_string(&keyed().to_response()).unwrap();
        assert!(!json.contains("sk-openai"));
        assert!(json.contains("\"openaiConfigured\":true"));
        assert!(json.contains("\"activeProvider\":\"openai\""));
    }

    #[test]
    fn test_apply_update_clamps_temperature() {
        let mut config = LLMConfig::default();
        config.apply_update(&LLMConfigUpdate {
            temperature: Some(5.0),
            structured_output: Some(true),
            openai_model: Some("gpt-4o-mini".into()),
            ..Default::default()
        });
        assert_eq!(config.temperature, 2.0);
        assert!(config.structured_output);
        assert_eq!(config.openai_model, "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        let mut config = LLMConfig {
            config_path: path.clone(),
            anthropic_api_key: Some("sk-ant".into()),
            preferred_provider: "anthropic".into(),
            ..Default::default()
        };
        config.structured_output = true;
        config.save().unwrap();

        let loaded = LLMConfig::load(&path);
        assert_eq!(loaded.preferred_provider, "anthropic");
        assert_eq!(loaded.anthropic_api_key.as_deref(), Some("sk-ant"));
        assert!(loaded.structured_output);
        assert_eq!(loaded.config_path, path);
    }

    #[test]
    fn test_completion_client_uses_base_url_override() {
        let config = LLMConfig {
            api_base_url: Some("http://127.0.0.1:9/v1".into()),
            ..keyed()
        };
        let client = config.completion_client(&Client::new()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/v1");
        assert_eq!(client.provider(), LLMProvider::OpenAI);
    }
}
