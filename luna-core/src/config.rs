//! Application settings: env-based with defaults.
//!
//! Callers load `.env` first (e.g. `dotenvy::dotenv()`), then build
//! [`Settings::from_env`] once at startup and pass pieces down explicitly.

use anyhow::{Context, Result};
use std::env;
use std::fmt::Debug;
use std::str::FromStr;

/// Limits consumed by the memory subsystem.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Short-term queue capacity, in items
    pub short_term_size: usize,
    /// Maximum turns kept per conversation context
    pub max_conversation_history: usize,
    /// Age threshold for pruning low-importance long-term items
    pub retention_days: i64,
    /// Soft cap on long-term entries per user; exceeding it only logs a
    /// warning, nothing is evicted
    pub long_term_soft_cap: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_size: 10,
            max_conversation_history: 50,
            retention_days: 30,
            long_term_soft_cap: None,
        }
    }
}

/// Process-wide settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub openai_max_tokens: u16,
    pub log_file: String,
    pub memory: MemoryConfig,
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
{
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    /// Load from environment variables. Only `OPENAI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let openai_model = env::var("MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let openai_temperature = env_or("OPENAI_TEMPERATURE", 0.7);
        let openai_max_tokens = env_or("OPENAI_MAX_TOKENS", 1000);
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/llm_server.log".to_string());

        let memory = MemoryConfig {
            short_term_size: env_or("SHORT_TERM_MEMORY_SIZE", 10),
            max_conversation_history: env_or("MAX_CONVERSATION_HISTORY", 50),
            retention_days: env_or("MEMORY_RETENTION_DAYS", 30),
            long_term_soft_cap: env::var("LONG_TERM_SOFT_CAP")
                .ok()
                .and_then(|s| s.parse().ok()),
        };

        Ok(Self {
            openai_api_key,
            openai_base_url,
            openai_model,
            openai_temperature,
            openai_max_tokens,
            log_file,
            memory,
        })
    }
}
