//! Static table from client-facing model keys to provider-native models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::provider::Provider;

/// Where a model key routes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub provider: Provider,
    /// Provider-native model id, e.g. `gpt-3.5-turbo`.
    pub model: String,
}

/// A model key that is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid model key selected: {key}")]
pub struct UnknownModelError {
    pub key: String,
}

/// Model keys resolved by exact, case-sensitive match.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// The keys shipped with the browser client.
    pub fn reference() -> Self {
        Self::from_entries([
            (
                "openai_gpt-3.5-turbo".to_string(),
                ModelEntry {
                    provider: Provider::OpenAI,
                    model: "gpt-3.5-turbo".to_string(),
                },
            ),
            (
                "anthropic_claude-3-haiku".to_string(),
                ModelEntry {
                    provider: Provider::Anthropic,
                    model: "claude-3-haiku-20240307".to_string(),
                },
            ),
        ])
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, ModelEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Add entries on top of this table. A repeated key replaces the old entry.
    #[must_use]
    pub fn extend(mut self, entries: impl IntoIterator<Item = (String, ModelEntry)>) -> Self {
        self.entries.extend(entries);
        self
    }

    pub fn resolve(&self, key: &str) -> Result<&ModelEntry, UnknownModelError> {
        self.entries.get(key).ok_or_else(|| UnknownModelError {
            key: key.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table() {
        let models = ModelRegistry::reference();
        assert_eq!(models.len(), 2);

        let openai = models.resolve("openai_gpt-3.5-turbo").unwrap();
        assert_eq!(openai.provider, Provider::OpenAI);
        assert_eq!(openai.model, "gpt-3.5-turbo");

        let anthropic = models.resolve("anthropic_claude-3-haiku").unwrap();
        assert_eq!(anthropic.provider, Provider::Anthropic);
        assert_eq!(anthropic.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let models = ModelRegistry::reference();
        for key in [
            "does-not-exist",
            "OPENAI_GPT-3.5-TURBO",
            "openai_gpt-3.5",
            " openai_gpt-3.5-turbo",
            "",
        ] {
            let err = models.resolve(key).unwrap_err();
            assert_eq!(err.key, key);
        }
    }

    #[test]
    fn test_extend_adds_and_replaces() {
        let models = ModelRegistry::reference().extend([
            (
                "openai_gpt-4o".to_string(),
                ModelEntry {
                    provider: Provider::OpenAI,
                    model: "gpt-4o".to_string(),
                },
            ),
            (
                "anthropic_claude-3-haiku".to_string(),
                ModelEntry {
                    provider: Provider::Anthropic,
                    model: "claude-3-5-haiku-latest".to_string(),
                },
            ),
        ]);

        assert_eq!(models.len(), 3);
        assert_eq!(models.resolve("openai_gpt-4o").unwrap().model, "gpt-4o");
        assert_eq!(
            models.resolve("anthropic_claude-3-haiku").unwrap().model,
            "claude-3-5-haiku-latest"
        );
    }
}
