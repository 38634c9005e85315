use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::screening::error::ScreeningError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Screening(#[from] ScreeningError),
}

/// Malformed request bodies are caller input errors, not axum's plain-text 422.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Screening(ScreeningError::validation(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Screening(e) => match e {
                ScreeningError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                ScreeningError::AlreadyRunning { .. } => {
                    (StatusCode::CONFLICT, "ALREADY_RUNNING", e.to_string())
                }
                ScreeningError::NotRunning { .. } => {
                    (StatusCode::CONFLICT, "NOT_RUNNING", e.to_string())
                }
                ScreeningError::Transport { .. } => {
                    tracing::error!("Scoring transport error: {e}");
                    (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR", e.to_string())
                }
                ScreeningError::Schema(_) => {
                    tracing::error!("Scoring schema error: {e}");
                    (StatusCode::BAD_GATEWAY, "SCHEMA_ERROR", e.to_string())
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
