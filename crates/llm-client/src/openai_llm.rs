//! OpenAI-backed [`LlmClient`] built on async-openai.

use anyhow::{anyhow, Result};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use luna_core::{ChatMessage, MessageRole};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{mask_token, EnvLlmConfig, GenerationParams, LlmClient};

/// OpenAI chat client. Wraps the async-openai client; holds the API key only
/// for masked logging.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    model: String,
    api_key_for_logging: String,
}

impl OpenAILlmClient {
    /// Builds a client using the given API key and the default base URL.
    pub fn new(api_key: String) -> Self {
        let api_key_for_logging = api_key.clone();
        let config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o".to_string(),
            api_key_for_logging,
        }
    }

    /// Builds a client with a custom base URL (proxies, compatible endpoints).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = api_key.clone();
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-4o".to_string(),
            api_key_for_logging,
        }
    }

    /// Builds a client from an env-based config.
    pub fn from_config(config: &EnvLlmConfig) -> Self {
        Self::with_base_url(config.openai_api_key.clone(), config.openai_base_url.clone())
            .with_model(config.model.clone())
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages, params))]
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<String> {
        let mut openai_messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(messages.len());
        for msg in &messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }

        info!(
            model = %self.model,
            message_count = openai_messages.len(),
            api_key = %mask_token(&self.api_key_for_logging),
            "OpenAI chat completion request"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(openai_messages)
            .temperature(params.temperature)
            .max_tokens(u32::from(params.max_tokens))
            .build()?;

        if let Ok(json) = serde_json::to_string_pretty(&request) {
            debug!(request_json = %json, "OpenAI chat completion request JSON");
        }

        let response = self.client.chat().create(request).await?;

        if let Some(ref usage) = response.usage {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "OpenAI chat completion usage"
            );
        }

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("OpenAI response contained no choices"))
    }
}
