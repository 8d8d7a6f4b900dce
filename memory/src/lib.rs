//! # Memory Crate
//!
//! Per-user conversational memory for the Luna personalization layer.
//!
//! ## Features
//!
//! - **Short-term memory**: fixed-capacity, recency-ordered, FIFO-evicted
//!   turn buffer
//! - **Long-term memory**: unbounded-until-pruned map of importance-tagged
//!   items, retrievable by lexical relevance
//! - **Conversation contexts**: named per-user threads, truncated to a
//!   configured maximum history
//! - **Relevance scoring**: Jaccard similarity over lower-cased
//!   whitespace-tokenized word sets (deliberately lexical, not semantic)
//! - **Snapshot serialization**: lossless serde round trip, queue capacity
//!   re-applied on restore
//!
//! ## Quick Start
//!
//! ```rust
//! use luna_core::{ChatMessage, MemoryConfig};
//! use memory::MemoryManager;
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = MemoryManager::new(MemoryConfig::default());
//!
//!     let user_memory = manager.get_user_memory("user123").await;
//!     user_memory
//!         .add_short_term_memory(&ChatMessage::user("오늘 힘든 일이 있었어"), 3)
//!         .await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`item`] - Memory item type and tag constants
//! - [`relevance`] - Lexical relevance scoring
//! - [`conversation`] - One user's memory store
//! - [`manager`] - Process-wide user registry

pub mod conversation;
pub mod item;
pub mod manager;
pub mod relevance;

pub use conversation::{ConversationMemory, MemorySnapshot};
pub use item::{
    MemoryItem, DEFAULT_RETRIEVAL_TYPES, MEMORY_TYPE_CONVERSATION, MEMORY_TYPE_IMPORTANT,
    MEMORY_TYPE_PREFERENCE, MEMORY_TYPE_USER_INFO,
};
pub use manager::{MemoryManager, MemoryStats};
pub use relevance::relevance;
