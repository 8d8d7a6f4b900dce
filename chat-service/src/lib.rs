//! # Chat Service
//!
//! Orchestration layer for the Luna personalization stack: resolves the
//! user's memory through [`memory::MemoryManager`], renders the persona
//! system prompt through the `prompt` crate, invokes the injected
//! [`llm_client::LlmClient`], and writes the turn back into memory after a
//! successful generation.
//!
//! The HTTP surface sits above this crate; everything here is
//! transport-agnostic.

pub mod models;
pub mod service;

pub use models::{ChatRequest, ChatResponse, Choice, PromptRequest, PromptResponse, Usage};
pub use service::{
    evaluate_message_importance, extract_important_info, ChatService, DEFAULT_SYSTEM_PROMPT,
};
