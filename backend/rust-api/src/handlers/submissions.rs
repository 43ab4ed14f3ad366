use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use super::ApiError;
use crate::{
    extractors::AppJson,
    models::submission::{SubmissionResult, SubmitExerciseRequest},
    services::AppState,
};

pub async fn submit_exercise(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubmitExerciseRequest>,
) -> Result<Json<SubmissionResult>, ApiError> {
    req.validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let result = state
        .recorder
        .submit(req.student_id, req.exercise_id, &req.answer_payload)
        .await?;

    Ok(Json(result))
}
