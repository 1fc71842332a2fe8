//! OpenAI chat-completions provider.
//!
//! Roles map one to one, so translation is a straight copy of the
//! conversation. The reply is the first choice's message content.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{CompletionError, LLMError, error_for_status};
use super::provider::{LLMProvider, Provider};
use super::types::{ChatMessage, Role};

/// Returned instead of calling the API when there is nothing to send.
pub const EMPTY_CONVERSATION_REPLY: &str = "Error: No messages to send to OpenAI.";

/// The remote "complete chat" operation for OpenAI-style APIs.
#[async_trait]
pub trait ChatCompletionsApi: Send + Sync {
    async fn create(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LLMError>;
}

/// HTTP client for `POST {base_url}/chat/completions`.
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    #[must_use]
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl ChatCompletionsApi for OpenAIClient {
    async fn create(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LLMError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        Ok(error_for_status(response).await?.json().await?)
    }
}

/// Adapter from the canonical conversation to OpenAI chat completions.
pub struct OpenAIAdapter {
    api: Arc<dyn ChatCompletionsApi>,
}

impl OpenAIAdapter {
    #[must_use]
    pub fn new(api: Arc<dyn ChatCompletionsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl LLMProvider for OpenAIAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(
        &self,
        conversation: &[ChatMessage],
        model: &str,
    ) -> Result<String, CompletionError> {
        let messages = to_messages(conversation);
        if messages.is_empty() {
            return Ok(EMPTY_CONVERSATION_REPLY.to_string());
        }

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
        };

        let response = self.api.create(&request).await.map_err(|e| {
            warn!(provider = %Provider::OpenAI, model, error = %e, "completion failed");
            CompletionError::Provider {
                provider: Provider::OpenAI,
                source: e,
            }
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "openai usage"
            );
        }

        from_response(response)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ============================================================================
// Conversions
// ============================================================================

fn to_messages(conversation: &[ChatMessage]) -> Vec<RequestMessage> {
    conversation
        .iter()
        .map(|msg| RequestMessage {
            role: msg.role(),
            content: msg.content().to_string(),
        })
        .collect()
}

fn from_response(response: ChatCompletionResponse) -> Result<String, CompletionError> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(CompletionError::Provider {
            provider: Provider::OpenAI,
            source: LLMError::MalformedResponse("response contained no choices".to_string()),
        });
    };
    Ok(choice.message.content.unwrap_or_default())
}
