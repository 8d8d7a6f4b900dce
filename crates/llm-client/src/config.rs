//! LLM configuration loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// LLM config for OpenAI-compatible APIs.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
}

impl EnvLlmConfig {
    /// Load from environment variables. Load `.env` first (e.g.
    /// `dotenvy::dotenv()`) for file-based configuration to take effect.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = env::var("MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        Ok(Self {
            openai_api_key,
            openai_base_url,
            model,
        })
    }
}
