//! # Luna Core
//!
//! Shared foundation for the Luna personalization layer: chat message and
//! persona types, the error taxonomy, environment-backed settings, and
//! tracing initialization.
//!
//! ## Modules
//!
//! - [`types`] - Chat messages, roles, persona settings, metadata values
//! - [`error`] - `LunaError` taxonomy and `Result` alias
//! - [`config`] - `Settings`/`MemoryConfig` loaded from the environment
//! - [`logger`] - Global tracing subscriber setup

pub mod config;
pub mod error;
pub mod logger;
pub mod types;

pub use config::{MemoryConfig, Settings};
pub use error::{LunaError, Result};
pub use logger::init_tracing;
pub use types::{
    ChatMessage, MessageRole, MetaValue, PersonaSettings, SpeechStyle, PERSONALITY_TYPES,
};
