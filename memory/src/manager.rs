//! # Memory Manager
//!
//! Process-wide registry mapping user identifiers to their
//! [`ConversationMemory`] stores, created lazily on first access.
//!
//! The registry is constructed once at startup and injected into every
//! request-handling context explicitly. Creation is race-safe: at most one
//! store is ever constructed per user id, even under concurrent first
//! accesses (first writer wins, later racers receive the winner's handle).
//!
//! ## Thread Safety
//!
//! The manager is a cheap-to-clone handle over `Arc<RwLock<HashMap>>`. The
//! registry lock is held only for lookup/insert; per-user mutations
//! serialize on each store's own lock, so requests for different users
//! never block each other.

use std::collections::HashMap;
use std::sync::Arc;

use luna_core::MemoryConfig;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::conversation::ConversationMemory;

/// Aggregate memory counts across all users, computed fresh on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total_users: usize,
    pub total_long_term_memories: usize,
    pub total_short_term_memories: usize,
}

/// Process-wide registry of per-user memory stores.
#[derive(Clone)]
pub struct MemoryManager {
    config: MemoryConfig,
    users: Arc<RwLock<HashMap<String, ConversationMemory>>>,
}

impl MemoryManager {
    /// Creates an empty registry with the given per-user memory limits.
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the user's store, constructing and registering it on first
    /// access. All handles returned for one user id share the same store.
    pub async fn get_user_memory(&self, user_id: &str) -> ConversationMemory {
        if let Some(memory) = self.users.read().await.get(user_id) {
            return memory.clone();
        }

        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_insert_with(|| {
                info!(user_id = %user_id, "new user memory created");
                ConversationMemory::new(user_id, self.config.clone())
            })
            .clone()
    }

    /// Prunes every registered user's long-term store, sequentially. One
    /// user's cleanup never aborts the pass for the others.
    pub async fn cleanup_all_memories(&self) {
        let users: Vec<ConversationMemory> =
            self.users.read().await.values().cloned().collect();

        for memory in users {
            let removed = memory.cleanup_old_memories().await;
            info!(user_id = %memory.user_id(), removed, "user memory cleanup finished");
        }
    }

    /// Aggregate counts across all registered users.
    pub async fn get_memory_stats(&self) -> MemoryStats {
        let users: Vec<ConversationMemory> =
            self.users.read().await.values().cloned().collect();

        let mut stats = MemoryStats {
            total_users: users.len(),
            total_long_term_memories: 0,
            total_short_term_memories: 0,
        };
        for memory in &users {
            let (long_term, short_term) = memory.counts().await;
            stats.total_long_term_memories += long_term;
            stats.total_short_term_memories += short_term;
        }
        stats
    }
}
