//! Chat completion handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::warn;

use crate::llm::ChatMessage;
use crate::response;
use crate::router::RouterError;
use crate::server::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    messages: Vec<MessageInput>,
    model: String,
}

/// A message as sent by the client. The role is validated separately so an
/// unknown role gets a clear error instead of a generic JSON rejection.
#[derive(Debug, Deserialize)]
pub struct MessageInput {
    role: String,
    content: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /chat
///
/// A body that does not deserialize keeps axum's status code but gets the
/// same `{"detail": ...}` shape as every other error.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return response::error(rejection.status(), rejection.body_text()).into_response();
        }
    };

    let conversation = match req
        .messages
        .into_iter()
        .map(|m| ChatMessage::new(&m.role, m.content))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(conversation) => conversation,
        Err(e) => return RouterError::from(e).into_response(),
    };

    match state.router.route(&conversation, &req.model).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            warn!(model_key = %req.model, error = %e, "chat request failed");
            e.into_response()
        }
    }
}
