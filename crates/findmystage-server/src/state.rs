//! Shared application state.

use findmystage_chat::LLMConfig;
use findmystage_core::AppConfig;
use findmystage_runtime::{Analyzer, ProfileBoard};
use parking_lot::RwLock;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: AppConfig,
    pub llm_config: RwLock<LLMConfig>,
    pub http: reqwest::Client,
    pub board: ProfileBoard,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
        Self::with_llm_config(config, llm_config)
    }

    pub fn with_llm_config(config: AppConfig, llm_config: LLMConfig) -> Self {
        Self {
            config,
            llm_config: RwLock::new(llm_config),
            http: reqwest::Client::new(),
            board: ProfileBoard::new(),
        }
    }

    /// Analyzer for the LLM config as it stands right now, so key changes
    /// apply to the next request.
    pub fn analyzer(&self) -> Analyzer {
        let llm = self.llm_config.read();
        Analyzer::from_config(&llm, &self.http, &self.config.profile_api_url)
    }
}
