//! # Memory Item
//!
//! This module defines [`MemoryItem`], a single fact or conversational turn
//! with importance, type, and access bookkeeping.
//!
//! ## Fields
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `content` | `String` | Text payload |
//! | `importance` | `u8` | 1-10; drives retention and ranking weight |
//! | `memory_type` | `String` | Coarse filter tag (open set) |
//! | `metadata` | `HashMap<String, MetaValue>` | Free-form key→value map |
//! | `created_at` | `DateTime<Utc>` | Creation instant |
//! | `last_accessed` | `DateTime<Utc>` | Last retrieval match |
//! | `access_count` | `u64` | Number of retrieval matches |
//!
//! `importance` is immutable after creation; only `last_accessed` and
//! `access_count` mutate, and only as a side effect of a successful
//! retrieval match.
//!
//! ## Serialization
//!
//! `MemoryItem` derives `Serialize`/`Deserialize`; timestamps render as
//! ISO-8601 via chrono's serde support. Malformed input fails at the serde
//! boundary with a data-format error.

use chrono::{DateTime, Utc};
use luna_core::MetaValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Memory type tag for conversational turns.
pub const MEMORY_TYPE_CONVERSATION: &str = "conversation";
/// Memory type tag for user facts.
pub const MEMORY_TYPE_USER_INFO: &str = "user_info";
/// Memory type tag for user preferences.
pub const MEMORY_TYPE_PREFERENCE: &str = "preference";
/// Memory type tag for explicitly flagged important entries.
pub const MEMORY_TYPE_IMPORTANT: &str = "important";

/// The type filter used when no explicit set is requested.
pub const DEFAULT_RETRIEVAL_TYPES: [&str; 3] = [
    MEMORY_TYPE_CONVERSATION,
    MEMORY_TYPE_USER_INFO,
    MEMORY_TYPE_PREFERENCE,
];

/// A single fact or conversational turn held in memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryItem {
    /// Text payload
    pub content: String,
    /// 1-10 importance; immutable after creation
    pub importance: u8,
    /// Coarse filter tag; open set, never exhaustively validated
    pub memory_type: String,
    /// Free-form metadata (e.g. originating role, timestamp)
    pub metadata: HashMap<String, MetaValue>,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last retrieval match
    pub last_accessed: DateTime<Utc>,
    /// Number of retrieval matches
    pub access_count: u64,
}

impl MemoryItem {
    /// Creates a new item stamped with the current time.
    pub fn new(
        content: impl Into<String>,
        importance: u8,
        memory_type: impl Into<String>,
        metadata: HashMap<String, MetaValue>,
    ) -> Self {
        let now = Utc::now();
        Self {
            content: content.into(),
            importance,
            memory_type: memory_type.into(),
            metadata,
            created_at: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Records a successful retrieval match.
    pub(crate) fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed = Utc::now();
    }
}
