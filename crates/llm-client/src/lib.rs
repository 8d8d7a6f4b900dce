//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI implementation.
//! Transport-agnostic; used by chat-service.
//!
//! Messages in, generated text out. Failures propagate untouched; there is
//! no retry and no synthesized fallback response at this layer.

use anyhow::Result;
use async_trait::async_trait;
use luna_core::ChatMessage;

mod config;
mod openai_llm;

pub use config::EnvLlmConfig;
pub use openai_llm::OpenAILlmClient;

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u16,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// LLM client interface: request a completion from a list of role-tagged
/// messages. Object-safe (dyn compatible) so callers can inject any backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for the given messages.
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<String>;
}

/// Masks an API key/token for safe logging: shows first 7 chars + "***" +
/// last 4 chars. If length <= 11, returns "***" to avoid leaking any part
/// of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head_len = 7.min(len);
        let tail_len = 4.min(len.saturating_sub(head_len));
        let head = &token[..head_len];
        let tail = if tail_len > 0 {
            &token[len - tail_len..]
        } else {
            ""
        };
        format!("{}***{}", head, tail)
    }
}
