//! Chat routing: model key in, normalized assistant reply out.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::llm::{
    ChatMessage, CompletionError, InvalidRoleError, LLMError, ModelRegistry, NormalizedReply,
    Provider, ProviderRegistry, UnknownModelError,
};

/// How bad a routing failure is from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The caller sent something we cannot serve.
    BadRequest,
    /// The relay cannot serve this right now (missing credential, rate limit).
    ServiceUnavailable,
    /// The provider failed.
    Upstream,
}

/// Errors returned by [`ChatRouter::route`].
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    InvalidRole(#[from] InvalidRoleError),

    #[error(transparent)]
    UnknownModel(#[from] UnknownModelError),

    #[error("{} model selected, but API key not configured", .provider.display_name())]
    ProviderUnavailable { provider: Provider },

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl RouterError {
    pub fn severity(&self) -> Severity {
        match self {
            RouterError::InvalidRole(_) | RouterError::UnknownModel(_) => Severity::BadRequest,
            RouterError::ProviderUnavailable { .. } => Severity::ServiceUnavailable,
            RouterError::Completion(CompletionError::InvalidRequest { .. }) => Severity::BadRequest,
            RouterError::Completion(CompletionError::Provider { source, .. }) => match source {
                // The provider rejected the payload built from the caller's conversation.
                LLMError::Api {
                    status: 400 | 422, ..
                } => Severity::BadRequest,
                LLMError::RateLimit { .. } => Severity::ServiceUnavailable,
                _ => Severity::Upstream,
            },
        }
    }
}

/// Resolves a model key and dispatches the conversation to its adapter.
///
/// Cheap to clone; every clone shares the same read-only tables.
#[derive(Clone)]
pub struct ChatRouter {
    models: Arc<ModelRegistry>,
    providers: ProviderRegistry,
}

impl ChatRouter {
    pub fn new(models: ModelRegistry, providers: ProviderRegistry) -> Self {
        Self {
            models: Arc::new(models),
            providers,
        }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Route one conversation. No caching, no retries and no fallback
    /// provider: every call is one remote request at most.
    pub async fn route(
        &self,
        conversation: &[ChatMessage],
        model_key: &str,
    ) -> Result<NormalizedReply, RouterError> {
        let entry = self.models.resolve(model_key)?;

        let Some(adapter) = self.providers.get(entry.provider) else {
            return Err(RouterError::ProviderUnavailable {
                provider: entry.provider,
            });
        };

        debug!(
            model_key,
            provider = %entry.provider,
            model = %entry.model,
            messages = conversation.len(),
            "routing chat request"
        );

        let content = adapter.complete(conversation, &entry.model).await?;
        Ok(NormalizedReply::assistant(content))
    }
}
