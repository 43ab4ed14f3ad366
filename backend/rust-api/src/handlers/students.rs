use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::ApiError;
use crate::{
    models::{
        progress::{ProgressRecord, ProgressStats},
        student::LivesStatus,
    },
    services::AppState,
};

pub async fn get_lives(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i64>,
) -> Result<Json<LivesStatus>, ApiError> {
    Ok(Json(state.recorder.lives_status(student_id).await?))
}

pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i64>,
) -> Result<Json<Vec<ProgressRecord>>, ApiError> {
    tracing::debug!("Listing progress for student {}", student_id);
    Ok(Json(state.recorder.list_progress(student_id).await?))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i64>,
) -> Result<Json<ProgressStats>, ApiError> {
    Ok(Json(state.recorder.stats(student_id).await?))
}
