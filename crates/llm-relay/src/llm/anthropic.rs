//! Anthropic LLM provider with native API format.
//!
//! Two things differ from the OpenAI shape: the system prompt travels in a
//! separate `system` field, and the reply is a list of typed content blocks
//! rather than a single string.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{CompletionError, LLMError, error_for_status};
use super::provider::{LLMProvider, Provider};
use super::types::{ChatMessage, Role};

/// Returned when the reply has content blocks but none of them are text.
pub const NO_TEXT_REPLY: &str = "[Anthropic response contained no processable text]";

/// The remote "complete chat" operation for the Anthropic Messages API.
#[async_trait]
pub trait MessagesApi: Send + Sync {
    async fn create(&self, request: &MessagesRequest) -> Result<MessagesResponse, LLMError>;
}

/// HTTP client for `POST {base_url}/v1/messages`.
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
}

impl AnthropicClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";

    #[must_use]
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

#[async_trait]
impl MessagesApi for AnthropicClient {
    async fn create(&self, request: &MessagesRequest) -> Result<MessagesResponse, LLMError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(request)
            .send()
            .await?;

        Ok(error_for_status(response).await?.json().await?)
    }
}

/// Adapter from the canonical conversation to the Anthropic Messages API.
pub struct AnthropicAdapter {
    api: Arc<dyn MessagesApi>,
    max_tokens: u32,
}

impl AnthropicAdapter {
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    #[must_use]
    pub fn new(api: Arc<dyn MessagesApi>) -> Self {
        Self {
            api,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl LLMProvider for AnthropicAdapter {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(
        &self,
        conversation: &[ChatMessage],
        model: &str,
    ) -> Result<String, CompletionError> {
        let request = to_request(conversation, model, self.max_tokens)?;

        let response = self.api.create(&request).await.map_err(|e| {
            warn!(provider = %Provider::Anthropic, model, error = %e, "completion failed");
            CompletionError::Provider {
                provider: Provider::Anthropic,
                source: e,
            }
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = response.stop_reason.as_deref().unwrap_or("none"),
                "anthropic usage"
            );
        }

        Ok(from_response(response))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    /// Absent when the conversation does not open with a system message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<RequestMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ResponseContent>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

/// A content block of any type. Only `text` blocks carry `text`.
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

// ============================================================================
// Conversions
// ============================================================================

/// Split off a leading system message and build the request.
///
/// Only position 0 is special. A system message further down the
/// conversation stays in the message list as-is.
fn to_request(
    conversation: &[ChatMessage],
    model: &str,
    max_tokens: u32,
) -> Result<MessagesRequest, CompletionError> {
    let (system, rest) = match conversation.split_first() {
        Some((first, rest)) if first.role() == Role::System => {
            (Some(first.content().to_string()), rest)
        }
        _ => (None, conversation),
    };

    let messages: Vec<RequestMessage> = rest
        .iter()
        .map(|msg| RequestMessage {
            role: msg.role(),
            content: msg.content().to_string(),
        })
        .collect();

    if !messages.iter().any(|m| m.role == Role::User) {
        return Err(CompletionError::InvalidRequest {
            provider: Provider::Anthropic,
            message: "no user messages provided".to_string(),
        });
    }

    Ok(MessagesRequest {
        model: model.to_string(),
        max_tokens,
        system,
        messages,
    })
}

fn from_response(response: MessagesResponse) -> String {
    if response.content.is_empty() {
        return String::new();
    }

    let mut text: Option<String> = None;
    for block in &response.content {
        if block.block_type == "text" {
            text.get_or_insert_with(String::new)
                .push_str(block.text.as_deref().unwrap_or_default());
        }
    }

    text.unwrap_or_else(|| {
        let types: Vec<&str> = response
            .content
            .iter()
            .map(|b| b.block_type.as_str())
            .collect();
        warn!(block_types = ?types, "anthropic response had no text blocks");
        NO_TEXT_REPLY.to_string()
    })
}
