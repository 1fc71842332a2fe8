use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::response;
use crate::router::ChatRouter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub router: ChatRouter,
}

pub fn build_app(state: AppState, static_dir: &Path, request_timeout: Duration) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/models", get(handlers::list_models))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .with_state(state)
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_detail))
}

/// The timeout layer answers with an empty body; give it a `detail` like
/// every other error.
async fn timeout_detail(res: Response) -> Response {
    if res.status() != StatusCode::REQUEST_TIMEOUT {
        return res;
    }
    response::error(StatusCode::REQUEST_TIMEOUT, "request timed out").into_response()
}
