//! # Core Types
//!
//! This module defines the core types shared across the Luna workspace.
//!
//! ## MessageRole
//!
//! Represents the role of a message in a conversation.
//!
//! ### Variants
//!
//! - `User`: Message sent by the user
//! - `Assistant`: Message sent by the AI assistant
//! - `System`: System-level message
//!
//! Roles serialize to the lowercase wire values (`"user"`, `"assistant"`,
//! `"system"`); any other string fails at the serde boundary.
//!
//! ## ChatMessage
//!
//! A single chat turn, one-to-one with one element of an OpenAI-style
//! `messages` array, plus an optional creation timestamp.
//!
//! ## PersonaSettings
//!
//! The tunable persona configuration (personality, speech register, emoji
//! density, empathy level, nickname, avoid-topics) controlling prompt
//! rendering. Validated at the boundary via [`PersonaSettings::validate`].
//!
//! ## MetaValue
//!
//! Closed set of value shapes for free-form key→value maps (memory item
//! metadata, user preference bags, user profiles). Keeps serialization and
//! testing deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LunaError, Result};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    /// Wire value of the role (`"user"`, `"assistant"`, `"system"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// A single chat message with an optional creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// The actual message content
    pub content: String,
    /// When the message was created
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Creates a message with the given role, stamped with the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Speech register of the persona: casual (반말) or polite (존댓말).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpeechStyle {
    #[serde(rename = "반말")]
    Banmal,
    #[serde(rename = "존댓말")]
    Jondaetmal,
}

impl SpeechStyle {
    /// Korean display value, as rendered into prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechStyle::Banmal => "반말",
            SpeechStyle::Jondaetmal => "존댓말",
        }
    }
}

impl Default for SpeechStyle {
    fn default() -> Self {
        SpeechStyle::Banmal
    }
}

/// A value in a free-form key→value map: string, list of strings, or integer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
    Int(i64),
}

impl MetaValue {
    /// The string payload, if this value is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The list payload, if this value is a `List`.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetaValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        MetaValue::List(items)
    }
}

/// Personality tags accepted by [`PersonaSettings::validate`].
pub const PERSONALITY_TYPES: [&str; 4] = ["친근함", "차분함", "활발함", "따뜻함"];

/// Persona configuration controlling prompt rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonaSettings {
    /// Personality tag; one of [`PERSONALITY_TYPES`] after validation
    pub personality_type: String,
    /// Speech register (반말/존댓말)
    pub speech_style: SpeechStyle,
    /// Emoji density, 1 (minimal) to 5 (frequent)
    pub emoji_usage: u8,
    /// Empathy level, 1 to 5
    pub empathy_level: u8,
    /// Nickname the persona addresses the user by
    pub nickname: Option<String>,
    /// Per-type memory priority hints
    pub memory_priorities: HashMap<String, i64>,
    /// Free-form user profile bag
    pub user_profile: HashMap<String, MetaValue>,
    /// Topics the persona must not bring up
    pub avoid_topics: Vec<String>,
}

impl Default for PersonaSettings {
    fn default() -> Self {
        Self {
            personality_type: "친근함".to_string(),
            speech_style: SpeechStyle::default(),
            emoji_usage: 3,
            empathy_level: 3,
            nickname: None,
            memory_priorities: HashMap::new(),
            user_profile: HashMap::new(),
            avoid_topics: Vec::new(),
        }
    }
}

impl PersonaSettings {
    /// Validates tag membership and level ranges.
    ///
    /// Surfaced to the caller immediately; a persona that fails validation
    /// never reaches prompt rendering.
    pub fn validate(&self) -> Result<()> {
        if !PERSONALITY_TYPES.contains(&self.personality_type.as_str()) {
            return Err(LunaError::Validation(format!(
                "unknown personality type: {}",
                self.personality_type
            )));
        }
        if !(1..=5).contains(&self.emoji_usage) {
            return Err(LunaError::Validation(format!(
                "emoji usage out of range 1-5: {}",
                self.emoji_usage
            )));
        }
        if !(1..=5).contains(&self.empathy_level) {
            return Err(LunaError::Validation(format!(
                "empathy level out of range 1-5: {}",
                self.empathy_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_serialization() {
        let role = MessageRole::User;
        let serialized = serde_json::to_string(&role).unwrap();
        assert_eq!(serialized, "\"user\"");

        let deserialized: MessageRole = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, MessageRole::User);
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        let result: std::result::Result<MessageRole, _> = serde_json::from_str("\"moderator\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::user("안녕");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "안녕");
        assert!(msg.timestamp.is_some());
    }

    #[test]
    fn test_speech_style_serialization() {
        let serialized = serde_json::to_string(&SpeechStyle::Banmal).unwrap();
        assert_eq!(serialized, "\"반말\"");

        let deserialized: SpeechStyle = serde_json::from_str("\"존댓말\"").unwrap();
        assert_eq!(deserialized, SpeechStyle::Jondaetmal);
    }

    #[test]
    fn test_meta_value_untagged_round_trip() {
        let text: MetaValue = serde_json::from_str("\"게임\"").unwrap();
        assert_eq!(text, MetaValue::Text("게임".to_string()));

        let list: MetaValue = serde_json::from_str("[\"여행\",\"음악\"]").unwrap();
        assert_eq!(
            list,
            MetaValue::List(vec!["여행".to_string(), "음악".to_string()])
        );

        let int: MetaValue = serde_json::from_str("7").unwrap();
        assert_eq!(int, MetaValue::Int(7));
    }

    #[test]
    fn test_persona_defaults_are_valid() {
        let persona = PersonaSettings::default();
        assert!(persona.validate().is_ok());
        assert_eq!(persona.personality_type, "친근함");
        assert_eq!(persona.speech_style, SpeechStyle::Banmal);
    }

    #[test]
    fn test_persona_validation_rejects_unknown_personality() {
        let persona = PersonaSettings {
            personality_type: "시니컬함".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            persona.validate(),
            Err(LunaError::Validation(_))
        ));
    }

    #[test]
    fn test_persona_validation_rejects_out_of_range_levels() {
        let persona = PersonaSettings {
            emoji_usage: 6,
            ..Default::default()
        };
        assert!(persona.validate().is_err());

        let persona = PersonaSettings {
            empathy_level: 0,
            ..Default::default()
        };
        assert!(persona.validate().is_err());
    }

    #[test]
    fn test_persona_camel_case_wire_format() {
        let json = r#"{
            "personalityType": "차분함",
            "speechStyle": "존댓말",
            "emojiUsage": 2,
            "empathyLevel": 4,
            "avoidTopics": ["정치"]
        }"#;
        let persona: PersonaSettings = serde_json::from_str(json).unwrap();
        assert_eq!(persona.personality_type, "차분함");
        assert_eq!(persona.speech_style, SpeechStyle::Jondaetmal);
        assert_eq!(persona.avoid_topics, vec!["정치".to_string()]);
        assert!(persona.validate().is_ok());
    }
}
