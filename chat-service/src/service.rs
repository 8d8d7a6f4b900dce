//! # Chat Service
//!
//! Orchestrates one chat turn: resolves the user's memory store, merges the
//! conversation context, renders the personalized system prompt, invokes
//! the LLM, and writes the turn back into memory after a successful
//! generation.
//!
//! Memory writes happen only after the model call succeeds; a failed call
//! propagates untouched and commits nothing.

use std::collections::HashMap;
use std::sync::Arc;

use llm_client::{GenerationParams, LlmClient};
use luna_core::{ChatMessage, LunaError, MessageRole, Result};
use memory::{ConversationMemory, MemoryManager, MemoryStats, MEMORY_TYPE_CONVERSATION};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::models::{ChatRequest, ChatResponse, Choice, PromptRequest, PromptResponse, Usage};

/// System prompt used when the request carries no persona settings.
pub const DEFAULT_SYSTEM_PROMPT: &str = "당신은 도움이 되는 AI 친구 루나입니다.";

/// Keywords that raise a message's evaluated importance.
const IMPORTANT_KEYWORDS: [&str; 27] = [
    "사랑", "결혼", "이별", "죽음", "병", "취업", "면접", "시험", "합격", "실패",
    "목표", "꿈", "희망", "절망", "스트레스", "우울", "기쁨", "행복", "가족",
    "친구", "관계", "갈등", "화해", "용서", "감사", "미안", "축하",
];

/// Patterns marking personal information worth keeping long-term.
const IMPORTANT_PATTERNS: [&str; 16] = [
    "내 이름은", "저는", "제가", "나는", "저희", "우리",
    "좋아하는", "싫어하는", "관심있는", "하고 싶은",
    "힘들어", "기뻐", "슬퍼", "화나", "걱정", "스트레스",
];

/// Importance at which an exchange is also written to long-term memory.
const LONG_TERM_IMPORTANCE_THRESHOLD: u8 = 7;

/// Chat orchestration service.
#[derive(Clone)]
pub struct ChatService {
    llm: Arc<dyn LlmClient>,
    memory_manager: MemoryManager,
}

impl ChatService {
    pub fn new(llm: Arc<dyn LlmClient>, memory_manager: MemoryManager) -> Self {
        Self {
            llm,
            memory_manager,
        }
    }

    /// Generates one chat completion.
    ///
    /// The request must carry at least one message, and any persona settings
    /// must validate; both fail fast with a validation error. A downstream
    /// model failure propagates with no memory committed for the turn.
    #[instrument(skip(self, request), fields(request_id = %Uuid::new_v4()))]
    pub async fn generate_response(
        &self,
        request: &ChatRequest,
        user_id: Option<&str>,
    ) -> Result<ChatResponse> {
        if request.messages.is_empty() {
            return Err(LunaError::Validation("messages must not be empty".to_string()));
        }
        if let Some(persona) = &request.ai_settings {
            persona.validate()?;
        }

        let user_memory = match user_id {
            Some(id) => Some(self.memory_manager.get_user_memory(id).await),
            None => None,
        };

        let conversation_context = self
            .prepare_conversation_context(request, user_memory.as_ref())
            .await;

        let system_prompt = self
            .create_system_prompt(request, user_memory.as_ref(), &conversation_context)
            .await;

        let mut messages = vec![ChatMessage::system(&system_prompt)];
        for msg in &request.messages {
            if msg.role != MessageRole::System {
                messages.push(msg.clone());
            }
        }
        debug!(message_count = messages.len(), "model message list assembled");

        let params = GenerationParams {
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let reply = self
            .llm
            .generate(messages, &params)
            .await
            .map_err(|e| LunaError::Llm(e.to_string()))?;

        let memory_updated = self
            .update_memory(request, &reply, user_memory.as_ref())
            .await;

        info!(
            user_id = ?user_id,
            model = %request.model,
            reply_chars = reply.chars().count(),
            memory_updated,
            "chat completion generated"
        );

        Ok(ChatResponse {
            choices: vec![Choice {
                message: ChatMessage::assistant(reply),
                finish_reason: "stop".to_string(),
                index: 0,
            }],
            model: request.model.clone(),
            usage: Usage::default(),
            conversation_id: request.conversation_id.clone(),
            memory_updated,
        })
    }

    /// Builds the personalized prompt and full message list without calling
    /// the model.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn build_prompt(&self, request: &PromptRequest) -> Result<PromptResponse> {
        request.ai_settings.validate()?;

        let user_memory = self.memory_manager.get_user_memory(&request.user_id).await;

        let conversation_context = match &request.conversation_id {
            Some(conversation_id) => {
                Some(user_memory.get_conversation_context(conversation_id).await)
            }
            None => None,
        };

        let system_prompt = prompt::create_personalized_system_prompt(
            &request.ai_settings,
            Some(&user_memory),
            conversation_context.as_deref(),
        )
        .await;

        let relevant_memories = user_memory.get_relevant_memories(&request.message, 3).await;

        let messages = prompt::assemble_messages(
            &system_prompt,
            conversation_context.as_deref(),
            &request.message,
            request.max_context_messages,
        );
        let context_length = messages.len() - 2;

        debug!(
            total_messages = messages.len(),
            context_length,
            "personalized prompt assembled"
        );

        Ok(PromptResponse {
            system_prompt,
            messages,
            context_length,
            memory_included: true,
            relevant_memories,
        })
    }

    /// Records a completed exchange in the user's memory: both turns go to
    /// short-term, and exchanges at or above the long-term threshold are
    /// also written to long-term as one combined entry. The long-term id is
    /// returned when one was written.
    #[instrument(skip(self, user_message, assistant_message))]
    pub async fn save_exchange(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
        user_message: &str,
        assistant_message: &str,
        importance: u8,
        memory_type: &str,
    ) -> Option<String> {
        let user_memory = self.memory_manager.get_user_memory(user_id).await;

        let user_turn = ChatMessage::user(user_message);
        let assistant_turn = ChatMessage::assistant(assistant_message);
        user_memory.add_short_term_memory(&user_turn, importance).await;
        user_memory
            .add_short_term_memory(&assistant_turn, importance)
            .await;

        let memory_id = if importance >= LONG_TERM_IMPORTANCE_THRESHOLD {
            let combined = format!("사용자: {}\nAI: {}", user_message, assistant_message);
            Some(
                user_memory
                    .add_long_term_memory(&combined, importance, memory_type, HashMap::new())
                    .await,
            )
        } else {
            None
        };

        if let Some(conversation_id) = conversation_id {
            let mut context = user_memory.get_conversation_context(conversation_id).await;
            context.push(user_turn);
            context.push(assistant_turn);
            user_memory
                .update_conversation_context(conversation_id, context)
                .await;
        }

        memory_id
    }

    pub async fn get_memory_stats(&self) -> MemoryStats {
        self.memory_manager.get_memory_stats().await
    }

    pub async fn cleanup_memories(&self) {
        self.memory_manager.cleanup_all_memories().await;
    }

    /// Merges the stored conversation context with the request's messages
    /// and writes the combined thread back (truncated by the store).
    async fn prepare_conversation_context(
        &self,
        request: &ChatRequest,
        user_memory: Option<&ConversationMemory>,
    ) -> Vec<ChatMessage> {
        let (memory, conversation_id) = match (user_memory, &request.conversation_id) {
            (Some(memory), Some(conversation_id)) => (memory, conversation_id),
            _ => return request.messages.clone(),
        };

        let mut all_messages = memory.get_conversation_context(conversation_id).await;
        all_messages.extend(request.messages.iter().cloned());
        memory
            .update_conversation_context(conversation_id, all_messages.clone())
            .await;
        all_messages
    }

    async fn create_system_prompt(
        &self,
        request: &ChatRequest,
        user_memory: Option<&ConversationMemory>,
        conversation_context: &[ChatMessage],
    ) -> String {
        match &request.ai_settings {
            Some(persona) => {
                debug!(personality = %persona.personality_type, "persona prompt requested");
                prompt::create_personalized_system_prompt(
                    persona,
                    user_memory,
                    Some(conversation_context),
                )
                .await
            }
            None => DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the successful turn back into memory. Returns whether a
    /// memory store was attached and updated; never fails the response.
    async fn update_memory(
        &self,
        request: &ChatRequest,
        reply: &str,
        user_memory: Option<&ConversationMemory>,
    ) -> bool {
        let memory = match user_memory {
            Some(memory) => memory,
            None => return false,
        };

        for msg in &request.messages {
            if msg.role == MessageRole::User {
                let importance = evaluate_message_importance(&msg.content);
                memory.add_short_term_memory(msg, importance).await;
            }
        }

        memory
            .add_short_term_memory(&ChatMessage::assistant(reply), 2)
            .await;

        if let Some(important_info) = extract_important_info(&request.messages) {
            memory
                .add_long_term_memory(
                    &important_info,
                    LONG_TERM_IMPORTANCE_THRESHOLD,
                    MEMORY_TYPE_CONVERSATION,
                    HashMap::new(),
                )
                .await;
        }

        debug!("memory updated for completed turn");
        true
    }
}

/// Evaluates a message's importance (1-10) from keyword hits and length.
pub fn evaluate_message_importance(content: &str) -> u8 {
    let content_lower = content.to_lowercase();
    let mut importance: u32 = 1;

    for keyword in IMPORTANT_KEYWORDS {
        if content_lower.contains(keyword) {
            importance += 2;
        }
    }

    if content.chars().count() > 100 {
        importance += 1;
    }

    importance.min(10) as u8
}

/// Extracts personal information worth keeping from the user's turns.
/// Returns the first matching turn tagged as user info.
pub fn extract_important_info(messages: &[ChatMessage]) -> Option<String> {
    for msg in messages {
        if msg.role != MessageRole::User {
            continue;
        }
        for pattern in IMPORTANT_PATTERNS {
            if msg.content.contains(pattern) {
                return Some(format!("사용자 정보: {}", msg.content));
            }
        }
    }
    None
}
