//! Request/response models for the chat and prompt operations.
//!
//! Field names mirror the upstream wire format: the persona settings key is
//! camelCase (`aiSettings`), the rest snake_case.

use luna_core::{ChatMessage, PersonaSettings};
use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u16 {
    1000
}

fn default_finish_reason() -> String {
    "stop".to_string()
}

fn default_max_context_messages() -> usize {
    6
}

/// A chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u16,
    #[serde(default, rename = "aiSettings")]
    pub ai_settings: Option<PersonaSettings>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// One response alternative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
    #[serde(default = "default_finish_reason")]
    pub finish_reason: String,
    #[serde(default)]
    pub index: u32,
}

/// Token accounting; zeroed when the backend reports none.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub memory_updated: bool,
}

/// A personalized prompt-construction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,
    pub message: String,
    #[serde(rename = "aiSettings")]
    pub ai_settings: PersonaSettings,
    #[serde(default = "default_max_context_messages", rename = "maxContextMessages")]
    pub max_context_messages: usize,
}

/// The constructed prompt plus the full message list for the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    #[serde(rename = "systemPrompt")]
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "contextLength")]
    pub context_length: usize,
    #[serde(rename = "memoryIncluded")]
    pub memory_included: bool,
    #[serde(default, rename = "relevantMemories")]
    pub relevant_memories: Vec<String>,
}
