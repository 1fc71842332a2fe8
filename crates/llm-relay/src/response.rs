//! JSON error responses.
//!
//! Error bodies use a single `detail` field, which is what the browser
//! client reads.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::router::{RouterError, Severity};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub fn error(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

pub fn service_unavailable(detail: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    error(StatusCode::SERVICE_UNAVAILABLE, detail)
}

pub fn status_for(severity: Severity) -> StatusCode {
    match severity {
        Severity::BadRequest => StatusCode::BAD_REQUEST,
        Severity::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Severity::Upstream => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        error(status_for(self.severity()), self.to_string()).into_response()
    }
}
