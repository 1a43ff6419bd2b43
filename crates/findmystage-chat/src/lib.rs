//! Chat-completion client for hosted LLM providers (OpenAI/Anthropic/Groq).
//!
//! One request, one reply. No streaming, retries or chunking; the credential
//! lives in backend configuration, never in client code.

pub mod config;
pub mod providers;
pub mod types;

pub use config::LLMConfig;
pub use providers::{CompletionClient, CompletionOptions};
pub use types::*;
