//! # Conversation Memory
//!
//! This module provides [`ConversationMemory`], one user's memory store.
//!
//! ## Layout
//!
//! - **Short-term memory**: fixed-capacity, recency-ordered queue of
//!   [`MemoryItem`]; appending at capacity silently drops the oldest entry
//!   (strict FIFO, importance plays no part in short-term retention).
//! - **Long-term memory**: map from a derived memory id to [`MemoryItem`];
//!   unbounded except by explicit age+importance pruning.
//! - **Conversation contexts**: named threads of [`ChatMessage`] turns,
//!   truncated to the configured maximum history on every update.
//! - **User preferences**: free-form key→value bag, set explicitly only.
//!
//! ## Thread Safety
//!
//! The store is a cheap-to-clone handle over `Arc<RwLock<..>>`: clones share
//! state, mutations for one user serialize on that user's own lock, and
//! different users never contend. Retrieval that updates access bookkeeping
//! takes the write lock (read-modify-write).

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{Duration, Utc};
use luna_core::{ChatMessage, LunaError, MemoryConfig, MetaValue};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::item::{MemoryItem, MEMORY_TYPE_CONVERSATION};
use crate::relevance::relevance;

/// Minimum relevance for `retrieve_relevant_memories` to keep an item.
const RELEVANCE_THRESHOLD: f64 = 0.3;
/// Minimum relevance for the query-oriented retrieval path.
const QUERY_RELEVANCE_THRESHOLD: f64 = 0.1;
/// Importance at or above which items survive age-based pruning.
const PRUNE_EXEMPT_IMPORTANCE: u8 = 7;
/// Characters kept per summary line before the ellipsis marker.
const SUMMARY_CONTENT_CHARS: usize = 50;
/// Returned by `get_memory_summary` when nothing qualifies.
const NO_MEMORY_SUMMARY: &str = "저장된 중요한 기억이 없습니다.";

struct MemoryState {
    short_term: VecDeque<MemoryItem>,
    long_term: HashMap<String, MemoryItem>,
    preferences: HashMap<String, MetaValue>,
    contexts: HashMap<String, Vec<ChatMessage>>,
}

/// Full-state export of one user's memory store.
///
/// Round-trips losslessly through serde except that the short-term queue
/// capacity is re-applied on reconstruction (oldest items dropped first).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemorySnapshot {
    pub user_id: String,
    pub short_term_memory: Vec<MemoryItem>,
    pub long_term_memory: HashMap<String, MemoryItem>,
    pub user_preferences: HashMap<String, MetaValue>,
    pub conversation_contexts: HashMap<String, Vec<ChatMessage>>,
}

/// One user's conversation memory store.
#[derive(Clone)]
pub struct ConversationMemory {
    user_id: Arc<str>,
    config: MemoryConfig,
    state: Arc<RwLock<MemoryState>>,
}

impl ConversationMemory {
    /// Creates an empty store for the given user.
    pub fn new(user_id: &str, config: MemoryConfig) -> Self {
        info!(user_id = %user_id, "memory store initialized");
        Self {
            user_id: Arc::from(user_id),
            state: Arc::new(RwLock::new(MemoryState {
                short_term: VecDeque::with_capacity(config.short_term_size),
                long_term: HashMap::new(),
                preferences: HashMap::new(),
                contexts: HashMap::new(),
            })),
            config,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// True when both handles share the same underlying store.
    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Wraps a chat turn as a `conversation` memory item and appends it to
    /// the short-term queue, silently dropping the oldest entry at capacity.
    pub async fn add_short_term_memory(&self, message: &ChatMessage, importance: u8) {
        if self.config.short_term_size == 0 {
            return;
        }

        let mut metadata = HashMap::new();
        metadata.insert(
            "role".to_string(),
            MetaValue::Text(message.role.as_str().to_string()),
        );
        if let Some(ts) = message.timestamp {
            metadata.insert("timestamp".to_string(), MetaValue::Text(ts.to_rfc3339()));
        }

        let item = MemoryItem::new(
            message.content.clone(),
            importance,
            MEMORY_TYPE_CONVERSATION,
            metadata,
        );

        let mut state = self.state.write().await;
        if state.short_term.len() == self.config.short_term_size {
            state.short_term.pop_front();
        }
        state.short_term.push_back(item);
        debug!(user_id = %self.user_id, "short-term memory appended");
    }

    /// Stores a long-term memory item and returns its derived id.
    ///
    /// The id hashes content, type, user id, and the nanosecond insertion
    /// instant; it is practically unique across insertions but not
    /// cryptographically guarded against collision. A colliding id silently
    /// overwrites the prior entry. Identical content stored twice yields two
    /// entries; age+importance pruning handles bloat.
    pub async fn add_long_term_memory(
        &self,
        content: &str,
        importance: u8,
        memory_type: &str,
        metadata: HashMap<String, MetaValue>,
    ) -> String {
        let memory_id = self.generate_memory_id(content, memory_type);
        let item = MemoryItem::new(content, importance, memory_type, metadata);

        let mut state = self.state.write().await;
        state.long_term.insert(memory_id.clone(), item);
        if let Some(cap) = self.config.long_term_soft_cap {
            if state.long_term.len() > cap {
                warn!(
                    user_id = %self.user_id,
                    entries = state.long_term.len(),
                    cap,
                    "long-term memory exceeds soft cap"
                );
            }
        }
        info!(user_id = %self.user_id, memory_id = %memory_id, "long-term memory added");
        memory_id
    }

    fn generate_memory_id(&self, content: &str, memory_type: &str) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let unique = format!("{}:{}:{}:{}", content, memory_type, self.user_id, nanos);
        let mut hasher = Sha256::new();
        hasher.update(unique.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Retrieves memories relevant to the current context.
    ///
    /// Scans the short-term queue then the long-term map, keeps items whose
    /// type is in `memory_types` and whose relevance to `current_context`
    /// exceeds 0.3, bumps access bookkeeping on every kept item, and returns
    /// the top `limit` items by descending relevance (stable on ties).
    pub async fn retrieve_relevant_memories(
        &self,
        current_context: &str,
        limit: usize,
        memory_types: &[&str],
    ) -> Vec<MemoryItem> {
        let mut state = self.state.write().await;
        let mut scored: Vec<(f64, MemoryItem)> = Vec::new();

        for item in state.short_term.iter_mut() {
            if !memory_types.contains(&item.memory_type.as_str()) {
                continue;
            }
            let score = relevance(current_context, &item.content);
            if score > RELEVANCE_THRESHOLD {
                item.touch();
                scored.push((score, item.clone()));
            }
        }

        for item in state.long_term.values_mut() {
            if !memory_types.contains(&item.memory_type.as_str()) {
                continue;
            }
            let score = relevance(current_context, &item.content);
            if score > RELEVANCE_THRESHOLD {
                item.touch();
                scored.push((score, item.clone()));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        debug!(
            user_id = %self.user_id,
            count = scored.len(),
            "relevant memories retrieved"
        );
        scored.into_iter().map(|(_, item)| item).collect()
    }

    /// Query-oriented retrieval returning memory contents, used by prompt
    /// building. Does not mutate access bookkeeping.
    ///
    /// A blank query returns the top `limit` long-term contents by
    /// importance alone. Otherwise long-term items with relevance above 0.1
    /// are ranked by `0.7 * importance/10 + 0.3 * relevance`; when fewer
    /// than `limit` qualify, short-term contents containing the query as a
    /// substring fill the remainder.
    pub async fn get_relevant_memories(&self, query: &str, limit: usize) -> Vec<String> {
        let state = self.state.read().await;

        if query.trim().is_empty() {
            let mut items: Vec<&MemoryItem> = state.long_term.values().collect();
            items.sort_by(|a, b| b.importance.cmp(&a.importance));
            return items
                .into_iter()
                .take(limit)
                .map(|item| item.content.clone())
                .collect();
        }

        let mut scored: Vec<(f64, &MemoryItem)> = state
            .long_term
            .values()
            .filter_map(|item| {
                let rel = relevance(query, &item.content);
                if rel > QUERY_RELEVANCE_THRESHOLD {
                    let combined = 0.7 * (item.importance as f64 / 10.0) + 0.3 * rel;
                    Some((combined, item))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut results: Vec<String> = scored
            .into_iter()
            .take(limit)
            .map(|(_, item)| item.content.clone())
            .collect();

        if results.len() < limit {
            for item in state.short_term.iter() {
                if results.len() >= limit {
                    break;
                }
                if item.content.contains(query) {
                    results.push(item.content.clone());
                }
            }
        }

        results
    }

    /// Returns the stored thread, or an empty sequence for unknown ids.
    pub async fn get_conversation_context(&self, conversation_id: &str) -> Vec<ChatMessage> {
        self.state
            .read()
            .await
            .contexts
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces the stored thread, truncated to the most recent
    /// `max_conversation_history` turns. Total replacement: callers combine
    /// prior and new turns before calling.
    pub async fn update_conversation_context(
        &self,
        conversation_id: &str,
        mut messages: Vec<ChatMessage>,
    ) {
        let max = self.config.max_conversation_history;
        if messages.len() > max {
            messages.drain(..messages.len() - max);
        }
        debug!(
            user_id = %self.user_id,
            conversation_id = %conversation_id,
            turns = messages.len(),
            "conversation context updated"
        );
        self.state
            .write()
            .await
            .contexts
            .insert(conversation_id.to_string(), messages);
    }

    /// Sets an explicit user preference.
    pub async fn add_user_preference(&self, key: &str, value: MetaValue) {
        info!(user_id = %self.user_id, key = %key, "user preference set");
        self.state
            .write()
            .await
            .preferences
            .insert(key.to_string(), value);
    }

    /// Returns a copy of the preference bag.
    pub async fn get_user_preferences(&self) -> HashMap<String, MetaValue> {
        self.state.read().await.preferences.clone()
    }

    /// Removes long-term items older than the retention window, unless their
    /// importance exempts them. Short-term memory is untouched (it
    /// self-evicts via its FIFO bound). Returns the number removed.
    pub async fn cleanup_old_memories(&self) -> usize {
        let cutoff = Utc::now() - Duration::days(self.config.retention_days);

        let mut state = self.state.write().await;
        let before = state.long_term.len();
        state
            .long_term
            .retain(|_, item| item.created_at >= cutoff || item.importance >= PRUNE_EXEMPT_IMPORTANCE);
        let removed = before - state.long_term.len();

        if removed > 0 {
            info!(user_id = %self.user_id, removed, "old memories pruned");
        }
        removed
    }

    /// Renders up to the 3 highest-importance long-term items with
    /// importance ≥ 7 as a bullet list, content truncated to 50 characters.
    pub async fn get_memory_summary(&self) -> String {
        let state = self.state.read().await;

        let mut items: Vec<&MemoryItem> = state
            .long_term
            .values()
            .filter(|item| item.importance >= PRUNE_EXEMPT_IMPORTANCE)
            .collect();
        items.sort_by(|a, b| b.importance.cmp(&a.importance));
        items.truncate(3);

        if items.is_empty() {
            return NO_MEMORY_SUMMARY.to_string();
        }

        items
            .iter()
            .map(|item| format!("- {}", truncate_chars(&item.content, SUMMARY_CONTENT_CHARS)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Exports the full store state.
    pub async fn snapshot(&self) -> MemorySnapshot {
        let state = self.state.read().await;
        MemorySnapshot {
            user_id: self.user_id.to_string(),
            short_term_memory: state.short_term.iter().cloned().collect(),
            long_term_memory: state.long_term.clone(),
            user_preferences: state.preferences.clone(),
            conversation_contexts: state.contexts.clone(),
        }
    }

    /// Reconstructs a store from an exported snapshot.
    ///
    /// The short-term queue capacity is re-applied: items beyond the new
    /// capacity are dropped, oldest first.
    pub fn from_snapshot(snapshot: MemorySnapshot, config: MemoryConfig) -> Self {
        let mut short_term = VecDeque::with_capacity(config.short_term_size);
        for item in snapshot.short_term_memory {
            if config.short_term_size == 0 {
                break;
            }
            if short_term.len() == config.short_term_size {
                short_term.pop_front();
            }
            short_term.push_back(item);
        }

        info!(user_id = %snapshot.user_id, "memory store restored from snapshot");
        Self {
            user_id: Arc::from(snapshot.user_id.as_str()),
            state: Arc::new(RwLock::new(MemoryState {
                short_term,
                long_term: snapshot.long_term_memory,
                preferences: snapshot.user_preferences,
                contexts: snapshot.conversation_contexts,
            })),
            config,
        }
    }

    /// Serializes the store to JSON.
    pub async fn to_json(&self) -> luna_core::Result<String> {
        Ok(serde_json::to_string(&self.snapshot().await)?)
    }

    /// Restores a store from JSON; malformed input surfaces a data-format
    /// error without constructing a partial store.
    pub fn from_json(json: &str, config: MemoryConfig) -> luna_core::Result<Self> {
        let snapshot: MemorySnapshot =
            serde_json::from_str(json).map_err(LunaError::DataFormat)?;
        Ok(Self::from_snapshot(snapshot, config))
    }

    /// (long-term, short-term) entry counts, for aggregate stats.
    pub(crate) async fn counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.long_term.len(), state.short_term.len())
    }
}

fn truncate_chars(content: &str, max: usize) -> String {
    if content.chars().count() <= max {
        content.to_string()
    } else {
        let head: String = content.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{MEMORY_TYPE_PREFERENCE, MEMORY_TYPE_USER_INFO};

    fn test_config() -> MemoryConfig {
        MemoryConfig::default()
    }

    #[tokio::test]
    async fn test_short_term_fifo_bound() {
        let memory = ConversationMemory::new("user123", test_config());

        for i in 1..=15 {
            let msg = ChatMessage::user(format!("메시지 {}", i));
            memory.add_short_term_memory(&msg, 1).await;
        }

        let snapshot = memory.snapshot().await;
        assert_eq!(snapshot.short_term_memory.len(), 10);
        assert_eq!(snapshot.short_term_memory[0].content, "메시지 6");
        assert_eq!(snapshot.short_term_memory[9].content, "메시지 15");
    }

    #[tokio::test]
    async fn test_short_term_keeps_all_under_capacity() {
        let memory = ConversationMemory::new("user123", test_config());

        for i in 1..=4 {
            let msg = ChatMessage::user(format!("메시지 {}", i));
            memory.add_short_term_memory(&msg, 1).await;
        }

        let snapshot = memory.snapshot().await;
        assert_eq!(snapshot.short_term_memory.len(), 4);
    }

    #[tokio::test]
    async fn test_short_term_metadata_carries_role() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_short_term_memory(&ChatMessage::assistant("응답"), 2)
            .await;

        let snapshot = memory.snapshot().await;
        let item = &snapshot.short_term_memory[0];
        assert_eq!(item.memory_type, MEMORY_TYPE_CONVERSATION);
        assert_eq!(
            item.metadata.get("role"),
            Some(&MetaValue::Text("assistant".to_string()))
        );
        assert!(item.metadata.contains_key("timestamp"));
    }

    #[tokio::test]
    async fn test_long_term_ids_are_unique_per_insertion() {
        let memory = ConversationMemory::new("user123", test_config());

        let id1 = memory
            .add_long_term_memory("같은 내용", 5, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;
        let id2 = memory
            .add_long_term_memory("같은 내용", 5, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;

        // no dedup: identical content yields two entries
        assert_ne!(id1, id2);
        let (long_term, _) = memory.counts().await;
        assert_eq!(long_term, 2);
    }

    #[tokio::test]
    async fn test_retrieve_filters_by_threshold_and_type() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_long_term_memory(
                "오늘 회사에서 힘든 일이 있었어",
                5,
                MEMORY_TYPE_CONVERSATION,
                HashMap::new(),
            )
            .await;
        memory
            .add_long_term_memory(
                "전혀 관계 없는 내용",
                5,
                MEMORY_TYPE_CONVERSATION,
                HashMap::new(),
            )
            .await;
        memory
            .add_long_term_memory(
                "오늘 회사에서 힘든 일이 있었어",
                5,
                "schedule",
                HashMap::new(),
            )
            .await;

        let results = memory
            .retrieve_relevant_memories(
                "오늘 회사에서 힘든 일이 있었어",
                5,
                &[MEMORY_TYPE_CONVERSATION],
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "오늘 회사에서 힘든 일이 있었어");
        // threshold gating: nothing at or below 0.3 sneaks in
        for item in &results {
            assert!(relevance("오늘 회사에서 힘든 일이 있었어", &item.content) > 0.3);
        }
    }

    #[tokio::test]
    async fn test_retrieve_updates_access_bookkeeping() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_long_term_memory(
                "오늘 힘든 일이 있었어",
                5,
                MEMORY_TYPE_CONVERSATION,
                HashMap::new(),
            )
            .await;

        let first = memory
            .retrieve_relevant_memories("오늘 힘든 일이 있었어", 5, &[MEMORY_TYPE_CONVERSATION])
            .await;
        assert_eq!(first[0].access_count, 1);

        let second = memory
            .retrieve_relevant_memories("오늘 힘든 일이 있었어", 5, &[MEMORY_TYPE_CONVERSATION])
            .await;
        assert_eq!(second[0].access_count, 2);
    }

    #[tokio::test]
    async fn test_retrieve_respects_limit_and_ordering() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_long_term_memory("오늘 일이 있었어", 5, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;
        memory
            .add_long_term_memory(
                "오늘 힘든 일이 있었어",
                5,
                MEMORY_TYPE_CONVERSATION,
                HashMap::new(),
            )
            .await;

        let results = memory
            .retrieve_relevant_memories("오늘 힘든 일이 있었어", 1, &[MEMORY_TYPE_CONVERSATION])
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "오늘 힘든 일이 있었어");
    }

    #[tokio::test]
    async fn test_get_relevant_memories_blank_query_orders_by_importance() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_long_term_memory("낮은 중요도", 2, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;
        memory
            .add_long_term_memory("높은 중요도", 9, MEMORY_TYPE_USER_INFO, HashMap::new())
            .await;
        memory
            .add_long_term_memory("중간 중요도", 5, MEMORY_TYPE_PREFERENCE, HashMap::new())
            .await;

        let results = memory.get_relevant_memories("", 5).await;
        assert_eq!(
            results,
            vec![
                "높은 중요도".to_string(),
                "중간 중요도".to_string(),
                "낮은 중요도".to_string()
            ]
        );

        let limited = memory.get_relevant_memories("  ", 2).await;
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0], "높은 중요도");
    }

    #[tokio::test]
    async fn test_get_relevant_memories_combined_scoring() {
        let memory = ConversationMemory::new("user123", test_config());
        // same relevance to the query, different importance
        memory
            .add_long_term_memory("시험 준비", 2, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;
        memory
            .add_long_term_memory("시험 합격", 9, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;

        let results = memory.get_relevant_memories("시험", 2).await;
        assert_eq!(results[0], "시험 합격");
    }

    #[tokio::test]
    async fn test_get_relevant_memories_backfills_from_short_term() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_short_term_memory(&ChatMessage::user("어제 시험 공부했어"), 1)
            .await;
        memory
            .add_short_term_memory(&ChatMessage::user("오늘 날씨 좋다"), 1)
            .await;

        // long-term is empty, so only substring matches from short-term fill in
        let results = memory.get_relevant_memories("시험", 3).await;
        assert_eq!(results, vec!["어제 시험 공부했어".to_string()]);
    }

    #[tokio::test]
    async fn test_get_relevant_memories_does_not_touch_bookkeeping() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_long_term_memory("시험 합격", 9, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;

        memory.get_relevant_memories("시험 합격", 3).await;

        let snapshot = memory.snapshot().await;
        let item = snapshot.long_term_memory.values().next().unwrap();
        assert_eq!(item.access_count, 0);
    }

    #[tokio::test]
    async fn test_conversation_context_unknown_id_is_empty() {
        let memory = ConversationMemory::new("user123", test_config());
        assert!(memory.get_conversation_context("nope").await.is_empty());
    }

    #[tokio::test]
    async fn test_conversation_context_truncates_to_max_history() {
        let config = MemoryConfig {
            max_conversation_history: 3,
            ..MemoryConfig::default()
        };
        let memory = ConversationMemory::new("user123", config);

        let turns: Vec<ChatMessage> = (1..=5)
            .map(|i| ChatMessage::user(format!("턴 {}", i)))
            .collect();
        memory.update_conversation_context("conv1", turns).await;

        let stored = memory.get_conversation_context("conv1").await;
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].content, "턴 3");
        assert_eq!(stored[2].content, "턴 5");
    }

    #[tokio::test]
    async fn test_cleanup_importance_exemption() {
        let config = test_config();
        let old = Utc::now() - Duration::days(90);

        let mut long_term = HashMap::new();
        let mut exempt = MemoryItem::new("아주 중요한 기억", 10, MEMORY_TYPE_USER_INFO, HashMap::new());
        exempt.created_at = old;
        long_term.insert("exempt".to_string(), exempt);

        let mut stale = MemoryItem::new("사소한 기억", 1, MEMORY_TYPE_CONVERSATION, HashMap::new());
        stale.created_at = old;
        long_term.insert("stale".to_string(), stale);

        let mut fresh = MemoryItem::new("최근 기억", 1, MEMORY_TYPE_CONVERSATION, HashMap::new());
        fresh.created_at = Utc::now();
        long_term.insert("fresh".to_string(), fresh);

        let memory = ConversationMemory::from_snapshot(
            MemorySnapshot {
                user_id: "user123".to_string(),
                short_term_memory: Vec::new(),
                long_term_memory: long_term,
                user_preferences: HashMap::new(),
                conversation_contexts: HashMap::new(),
            },
            config,
        );

        let removed = memory.cleanup_old_memories().await;
        assert_eq!(removed, 1);

        let snapshot = memory.snapshot().await;
        assert!(snapshot.long_term_memory.contains_key("exempt"));
        assert!(snapshot.long_term_memory.contains_key("fresh"));
        assert!(!snapshot.long_term_memory.contains_key("stale"));
    }

    #[tokio::test]
    async fn test_memory_summary_formats_top_items() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_long_term_memory("중요한 기억 하나", 9, MEMORY_TYPE_USER_INFO, HashMap::new())
            .await;
        memory
            .add_long_term_memory("덜 중요한 기억", 3, MEMORY_TYPE_CONVERSATION, HashMap::new())
            .await;
        let long_content = "가".repeat(60);
        memory
            .add_long_term_memory(&long_content, 8, MEMORY_TYPE_USER_INFO, HashMap::new())
            .await;

        let summary = memory.get_memory_summary().await;
        assert!(summary.contains("- 중요한 기억 하나"));
        assert!(!summary.contains("덜 중요한 기억"));
        let truncated = format!("- {}...", "가".repeat(50));
        assert!(summary.contains(&truncated));
    }

    #[tokio::test]
    async fn test_memory_summary_empty_message() {
        let memory = ConversationMemory::new("user123", test_config());
        assert_eq!(memory.get_memory_summary().await, NO_MEMORY_SUMMARY);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let memory = ConversationMemory::new("user123", test_config());
        memory
            .add_short_term_memory(&ChatMessage::user("안녕"), 1)
            .await;
        memory
            .add_long_term_memory("장기 기억", 8, MEMORY_TYPE_USER_INFO, HashMap::new())
            .await;
        memory
            .add_user_preference("interests", MetaValue::List(vec!["음악".to_string()]))
            .await;
        memory
            .update_conversation_context("conv1", vec![ChatMessage::user("첫 턴")])
            .await;
        memory
            .update_conversation_context("conv2", vec![ChatMessage::assistant("다른 턴")])
            .await;

        let json = memory.to_json().await.unwrap();
        let restored = ConversationMemory::from_json(&json, test_config()).unwrap();

        assert_eq!(restored.snapshot().await, memory.snapshot().await);
    }

    #[tokio::test]
    async fn test_restore_reapplies_queue_capacity() {
        let memory = ConversationMemory::new("user123", test_config());
        for i in 1..=10 {
            memory
                .add_short_term_memory(&ChatMessage::user(format!("메시지 {}", i)), 1)
                .await;
        }

        let snapshot = memory.snapshot().await;
        let small = MemoryConfig {
            short_term_size: 4,
            ..MemoryConfig::default()
        };
        let restored = ConversationMemory::from_snapshot(snapshot, small);

        let after = restored.snapshot().await;
        assert_eq!(after.short_term_memory.len(), 4);
        assert_eq!(after.short_term_memory[0].content, "메시지 7");
        assert_eq!(after.short_term_memory[3].content, "메시지 10");
    }

    #[tokio::test]
    async fn test_from_json_rejects_corrupt_record() {
        let result = ConversationMemory::from_json("{\"user_id\": 42}", test_config());
        assert!(matches!(result, Err(LunaError::DataFormat(_))));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("짧은 내용", 50), "짧은 내용");
        let long = "가나다라마".repeat(20);
        let truncated = truncate_chars(&long, 50);
        assert_eq!(truncated.chars().count(), 53);
        assert!(truncated.ends_with("..."));
    }

    #[tokio::test]
    async fn test_handles_share_state() {
        let memory = ConversationMemory::new("user123", test_config());
        let clone = memory.clone();
        clone
            .add_short_term_memory(&ChatMessage::user("공유 확인"), 1)
            .await;

        let snapshot = memory.snapshot().await;
        assert_eq!(snapshot.short_term_memory.len(), 1);
        assert!(memory.shares_state_with(&clone));
    }
}
