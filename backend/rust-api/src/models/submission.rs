use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitExerciseRequest {
    #[validate(range(min = 1, message = "student_id must be positive"))]
    pub student_id: i64,

    #[validate(range(min = 1, message = "exercise_id must be positive"))]
    pub exercise_id: i64,

    /// Kind-specific answer body; shape is checked by the grader.
    pub answer_payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub score: u32,
    pub point_value: u32,
    pub completed_perfectly: bool,
    /// True when this submission spent the last life.
    pub locked_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockout_remaining_ms: Option<i64>,
    pub lives: u32,
    pub level: u32,
    pub points_total: u32,
    pub attempts: u32,
}
