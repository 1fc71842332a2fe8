use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::response;
use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Ready once at least one provider has a credential.
pub async fn readyz(State(state): State<AppState>) -> Response {
    if state.router.providers().is_empty() {
        return response::service_unavailable("no LLM providers configured").into_response();
    }
    (StatusCode::OK, "ok").into_response()
}
