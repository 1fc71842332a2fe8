//! LLM provider adapters and the tables that select them.

mod anthropic;
mod error;
mod models;
mod openai;
mod provider;
mod registry;
mod types;

pub use anthropic::{
    AnthropicAdapter, AnthropicClient, MessagesApi, MessagesRequest, MessagesResponse,
    NO_TEXT_REPLY, ResponseContent, ResponseUsage,
};
pub use error::{CompletionError, LLMError};
pub use models::{ModelEntry, ModelRegistry, UnknownModelError};
pub use openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatCompletionsApi, Choice,
    EMPTY_CONVERSATION_REPLY, OpenAIAdapter, OpenAIClient, ResponseMessage, Usage,
};
pub use provider::{LLMProvider, Provider};
pub use registry::{Credentials, ProviderRegistry};
pub use types::{ChatMessage, InvalidRoleError, NormalizedReply, Role};
