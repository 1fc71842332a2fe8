//! LLM error types.

use thiserror::Error;

use super::provider::Provider;

/// Transport-level faults from a provider's HTTP API.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Could not reach the provider or decode its JSON.
    #[error("request to provider failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer other than 429; `message` is the raw body.
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// 429, with `retry-after` in seconds when the provider sent one.
    #[error("rate limited by provider (retry after {retry_after:?}s)")]
    RateLimit { retry_after: Option<u64> },

    /// 2xx, but the payload lacks something the adapter needs.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Pass a successful response through; turn anything else into an `LLMError`.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LLMError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return Err(LLMError::RateLimit { retry_after });
    }

    Err(LLMError::Api {
        status: status.as_u16(),
        message: response.text().await.unwrap_or_default(),
    })
}

/// Errors surfaced by a provider adapter.
///
/// Transport faults never leave an adapter on their own; they are always
/// tagged with the provider that produced them.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The conversation cannot be expressed in the provider's format.
    #[error("{message} ({} request)", .provider.display_name())]
    InvalidRequest { provider: Provider, message: String },

    /// The remote call failed.
    #[error("{} API error: {source}", .provider.display_name())]
    Provider {
        provider: Provider,
        #[source]
        source: LLMError,
    },
}

impl CompletionError {
    pub fn provider(&self) -> Provider {
        match self {
            CompletionError::InvalidRequest { provider, .. }
            | CompletionError::Provider { provider, .. } => *provider,
        }
    }
}
