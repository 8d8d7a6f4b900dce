//! # Prompt
//!
//! Renders the persona configuration, user memory, and conversation context
//! into the system prompt sent to the model, and assembles the final
//! message list.
//!
//! ## Blocks
//!
//! The system prompt concatenates up to four blocks, blank-line separated,
//! in fixed order:
//!
//! 1. **Base persona**: speech-register rules as contrastive wrong/right
//!    examples, personality tone, emoji density, empathy level, avoid-topics
//!    disclaimer, and a worked example response
//! 2. **User info** (optional): built from explicit preference keys only
//! 3. **Relevant memories** (optional): retrieved against the last context
//!    turn
//! 4. **Recent context** (optional): the last 3 turns with role markers
//!
//! ## External interactions
//!
//! - **AI models**: Output is sent to LLM APIs as the system message.
//! - **Memory**: the memory block retrieves (and thereby access-stamps)
//!   relevant memories from the user's store.

use luna_core::{ChatMessage, MessageRole, PersonaSettings, SpeechStyle};
use memory::{ConversationMemory, DEFAULT_RETRIEVAL_TYPES};
use tracing::debug;

/// Nickname used when the persona has none configured.
pub const DEFAULT_NICKNAME: &str = "친구";

/// Maximum memories rendered into the memory block.
const MEMORY_BLOCK_LIMIT: usize = 3;

/// Turns of conversation rendered into the recent-context block.
const CONTEXT_BLOCK_TURNS: usize = 3;

/// Builds the personalized system prompt from persona settings, optional
/// user memory, and optional conversation context.
///
/// Blocks that have nothing to say are omitted entirely rather than
/// rendered empty.
pub async fn create_personalized_system_prompt(
    persona: &PersonaSettings,
    user_memory: Option<&ConversationMemory>,
    conversation_context: Option<&[ChatMessage]>,
) -> String {
    let mut blocks = vec![base_personality_block(persona)];

    if let Some(memory) = user_memory {
        let user_info = user_info_block(memory).await;
        if !user_info.is_empty() {
            blocks.push(user_info);
        }
    }

    if let (Some(memory), Some(context)) = (user_memory, conversation_context) {
        let memories = memory_block(memory, context).await;
        if !memories.is_empty() {
            blocks.push(memories);
        }
    }

    if let Some(context) = conversation_context {
        let recent = recent_context_block(context);
        if !recent.is_empty() {
            blocks.push(recent);
        }
    }

    let prompt = blocks.join("\n\n");
    debug!(chars = prompt.len(), "personalized system prompt built");
    prompt
}

/// Assembles the full message list for the model: system prompt first, then
/// up to `max_context_messages` most-recent context turns (system-role turns
/// excluded), then the current user message last.
pub fn assemble_messages(
    system_prompt: &str,
    conversation_context: Option<&[ChatMessage]>,
    current_message: &str,
    max_context_messages: usize,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];

    if let Some(context) = conversation_context {
        let start = context.len().saturating_sub(max_context_messages);
        for msg in &context[start..] {
            if msg.role != MessageRole::System {
                messages.push(msg.clone());
            }
        }
    }

    messages.push(ChatMessage::user(current_message));
    messages
}

fn base_personality_block(persona: &PersonaSettings) -> String {
    let nickname = persona.nickname.as_deref().unwrap_or(DEFAULT_NICKNAME);
    let speech_style = persona.speech_style.as_str();
    let personality = persona.personality_type.as_str();

    let mut block = format!(
        "당신은 '{nickname}'의 AI 친구 '루나'입니다.\n\n{speech}\n\n🎭 성격: {personality_instruction} 대화하세요.\n\n😊 이모티콘: {emoji}\n\n💕 공감: {empathy}",
        nickname = nickname,
        speech = speech_instruction(persona.speech_style),
        personality_instruction = personality_instruction(personality),
        emoji = emoji_instruction(persona.emoji_usage),
        empathy = empathy_instruction(persona.empathy_level),
    );

    if !persona.avoid_topics.is_empty() {
        block.push_str(&format!(
            "\n\n🚫 피해야 할 주제: {}",
            persona.avoid_topics.join(", ")
        ));
    }

    block.push_str(&format!(
        "\n\n💬 대화 예시:\n사용자: \"오늘 힘든 일이 있었어\"\n{speech_style} 응답: \"{example}\"",
        speech_style = speech_style,
        example = example_response(persona.speech_style),
    ));

    block.push_str(&format!(
        "\n\n⚠️ 절대 지켜야 할 규칙:\n1. {speech_style}을 절대 바꾸지 마세요\n2. {personality} 성격을 일관되게 유지하세요\n3. 진짜 친구처럼 개인적이고 따뜻하게 대화하세요\n4. 단답형보다는 관심을 보이며 대화를 이어가세요\n5. 사용자의 감정에 공감하고 적절한 위로를 제공하세요\n\n지금부터 {nickname}와 {speech_style}로 {personality} 성격으로 대화를 시작합니다!",
        speech_style = speech_style,
        personality = personality,
        nickname = nickname,
    ));

    block
}

/// Contrastive wrong/right examples so the model cannot miss the register.
fn speech_instruction(style: SpeechStyle) -> &'static str {
    match style {
        SpeechStyle::Banmal => {
            "⚠️ 중요: 반드시 반말로만 대화하세요!\n- \"안녕하세요\" ❌ → \"안녕!\" ✅\n- \"어떻게 지내시나요?\" ❌ → \"어떻게 지내?\" ✅\n- \"도움이 되었기를 바랍니다\" ❌ → \"도움이 됐으면 좋겠어\" ✅\n- \"감사합니다\" ❌ → \"고마워\" ✅"
        }
        SpeechStyle::Jondaetmal => {
            "⚠️ 중요: 반드시 격식체(존댓말)로만 대화하세요!\n- \"안녕!\" ❌ → \"안녕하세요\" ✅\n- \"어떻게 지내?\" ❌ → \"어떻게 지내시나요?\" ✅"
        }
    }
}

/// Tone instruction per personality tag; unknown tags fall back to a
/// generic friendly-and-warm instruction rather than failing.
fn personality_instruction(personality: &str) -> &'static str {
    match personality {
        "친근함" => "매우 친근하고 편안한 톤으로, 마치 오랜 친구와 대화하듯이",
        "차분함" => "차분하고 안정적인 톤으로, 신중하게",
        "활발함" => "밝고 에너지 넘치는 톤으로, 긍정적이고 활기차게",
        "따뜻함" => "따뜻하고 포근한 톤으로, 위로가 되도록",
        _ => "친근하고 따뜻하게",
    }
}

fn emoji_instruction(emoji_usage: u8) -> &'static str {
    if emoji_usage >= 4 {
        "이모티콘을 자주 사용해서 감정을 풍부하게 표현하세요. (예: 😊, 😢, 🎉, 💕, 👍 등)"
    } else if emoji_usage >= 3 {
        "이모티콘을 적당히 사용해서 감정을 표현하세요."
    } else {
        "이모티콘 사용을 최소화하세요."
    }
}

/// Empathy instruction per level; unknown levels fall back to level 2.
fn empathy_instruction(empathy_level: u8) -> &'static str {
    match empathy_level {
        1 => "기본적인 공감을 표현하세요.",
        2 => "적당한 공감과 관심을 보이세요.",
        3 => "따뜻한 공감과 위로를 제공하세요.",
        4 => "깊은 공감과 정서적 지지를 제공하세요.",
        5 => "매우 깊은 공감과 치유적인 대화를 제공하세요.",
        _ => "적당한 공감과 관심을 보이세요.",
    }
}

fn example_response(style: SpeechStyle) -> &'static str {
    match style {
        SpeechStyle::Banmal => "어떤 일이었어? 힘들었구나 😢 이야기 들어줄게",
        SpeechStyle::Jondaetmal => "어떤 일이 있으셨나요? 힘드셨겠어요 😢 이야기 들어드릴게요",
    }
}

/// Renders the user-info block from the explicit preference keys
/// `interests`, `current_goals`, and `preferred_topics`. Empty when none of
/// them are set.
async fn user_info_block(memory: &ConversationMemory) -> String {
    let preferences = memory.get_user_preferences().await;

    let mut lines = Vec::new();
    for (key, label) in [
        ("interests", "관심사"),
        ("current_goals", "현재 목표"),
        ("preferred_topics", "선호 주제"),
    ] {
        if let Some(items) = preferences.get(key).and_then(|value| value.as_list()) {
            if !items.is_empty() {
                lines.push(format!("- {}: {}", label, items.join(", ")));
            }
        }
    }

    if lines.is_empty() {
        return String::new();
    }

    format!("📋 사용자 정보:\n{}", lines.join("\n"))
}

/// Renders the relevant-memory block against the last context turn. Empty
/// when the context is empty or nothing relevant is found.
async fn memory_block(memory: &ConversationMemory, context: &[ChatMessage]) -> String {
    let current_context = match context.last() {
        Some(turn) => turn.content.as_str(),
        None => return String::new(),
    };

    let relevant = memory
        .retrieve_relevant_memories(current_context, MEMORY_BLOCK_LIMIT, &DEFAULT_RETRIEVAL_TYPES)
        .await;

    if relevant.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = relevant
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.content))
        .collect();

    format!(
        "🧠 관련 기억:\n{}\n\n위 기억들을 참고하여 일관성 있는 대화를 이어가세요.",
        lines.join("\n")
    )
}

/// Renders the last turns of the conversation with role markers.
fn recent_context_block(context: &[ChatMessage]) -> String {
    if context.is_empty() {
        return String::new();
    }

    let start = context.len().saturating_sub(CONTEXT_BLOCK_TURNS);
    let lines: Vec<String> = context[start..]
        .iter()
        .map(|msg| {
            let marker = if msg.role == MessageRole::User { "👤" } else { "🤖" };
            format!("{} {}", marker, msg.content)
        })
        .collect();

    format!(
        "💬 최근 대화 맥락:\n{}\n\n위 맥락을 고려하여 자연스럽게 대화를 이어가세요.",
        lines.join("\n")
    )
}
