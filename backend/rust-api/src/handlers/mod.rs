use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::{recorder::SubmissionError, AppState};

pub mod students;
pub mod submissions;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Locked {
        message: String,
        lockout_remaining_ms: i64,
    },
    Internal(String),
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            SubmissionError::Validation(message) => ApiError::BadRequest(message),
            SubmissionError::Locked { remaining } => ApiError::Locked {
                message: err.to_string(),
                lockout_remaining_ms: remaining.num_milliseconds(),
            },
            SubmissionError::Storage(source) => {
                tracing::error!("Storage failure: {:#}", source);
                ApiError::Internal("Storage failure".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": message, "status": 400 }),
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({ "message": message, "status": 404 }),
            ),
            ApiError::Locked {
                message,
                lockout_remaining_ms,
            } => (
                StatusCode::LOCKED,
                json!({
                    "message": message,
                    "status": 423,
                    "lockout_remaining_ms": lockout_remaining_ms
                }),
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": message, "status": 500 }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.recorder.store();
    let (status_code, status, store_health) = match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            "healthy",
            json!({ "status": "healthy", "backend": store.backend_name() }),
        ),
        Err(e) => {
            tracing::warn!("Store health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "degraded",
                json!({
                    "status": "unhealthy",
                    "backend": store.backend_name(),
                    "error": e.to_string()
                }),
            )
        }
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "edunow-progress",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": { "store": store_health }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}
