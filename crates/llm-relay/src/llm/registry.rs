//! Provider registry for managing LLM provider instances.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use super::anthropic::{AnthropicAdapter, AnthropicClient};
use super::openai::{OpenAIAdapter, OpenAIClient};
use super::provider::{LLMProvider, Provider};
use crate::config::ProvidersConfig;

/// API keys per provider. A missing key disables that provider.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
}

impl Credentials {
    /// Read keys from the environment. Empty values count as unset.
    pub fn from_env() -> Self {
        let read = |provider: Provider| {
            std::env::var(provider.api_key_env())
                .ok()
                .filter(|v| !v.trim().is_empty())
        };
        Self {
            openai: read(Provider::OpenAI),
            anthropic: read(Provider::Anthropic),
        }
    }
}

/// Registry of LLM providers, keyed by provider type.
///
/// Only providers with a configured credential are registered, so a lookup
/// miss means the provider is unavailable.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every provider that has a credential.
    pub fn from_config(config: &ProvidersConfig, credentials: &Credentials) -> Self {
        let mut registry = Self::new();
        let client = Client::new();

        if let Some(api_key) = credentials.openai.clone() {
            let api = OpenAIClient::new(client.clone(), api_key, config.openai.base_url.clone());
            registry.register(Arc::new(OpenAIAdapter::new(Arc::new(api))));
            info!(base_url = %config.openai.base_url, "Registered OpenAI provider");
        } else {
            warn!("OPENAI_API_KEY not set; OpenAI models will not be available");
        }

        if let Some(api_key) = credentials.anthropic.clone() {
            let api = AnthropicClient::new(client, api_key, config.anthropic.base_url.clone())
                .with_api_version(config.anthropic.api_version.clone());
            let adapter =
                AnthropicAdapter::new(Arc::new(api)).with_max_tokens(config.anthropic.max_tokens);
            registry.register(Arc::new(adapter));
            info!(base_url = %config.anthropic.base_url, "Registered Anthropic provider");
        } else {
            warn!("ANTHROPIC_API_KEY not set; Anthropic models will not be available");
        }

        if registry.is_empty() {
            warn!("No LLM providers configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY.");
        }

        registry
    }

    /// Register a provider implementation under the provider it reports.
    pub fn register(&mut self, implementation: Arc<dyn LLMProvider>) {
        self.providers
            .insert(implementation.provider(), implementation);
    }

    /// Get a provider by type.
    pub fn get(&self, provider: Provider) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(&provider).cloned()
    }

    pub fn is_available(&self, provider: Provider) -> bool {
        self.providers.contains_key(&provider)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
