use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::llm::Provider;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    key: String,
    provider: Provider,
    model: String,
    /// Whether the provider has a credential configured.
    available: bool,
}

#[derive(Debug, Serialize)]
pub struct ListModelsResponse {
    models: Vec<ModelInfo>,
}

/// GET /models
pub async fn list_models(State(state): State<AppState>) -> Json<ListModelsResponse> {
    let providers = state.router.providers();
    let models = state
        .router
        .models()
        .iter()
        .map(|(key, entry)| ModelInfo {
            key: key.to_string(),
            provider: entry.provider,
            model: entry.model.clone(),
            available: providers.is_available(entry.provider),
        })
        .collect();

    Json(ListModelsResponse { models })
}
