use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    InProgress,
    Completed,
}

/// One row per (student, exercise), overwritten on every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_id: i64,
    pub exercise_id: i64,
    pub state: ProgressState,
    pub attempts: u32,
    pub score_awarded: u32,
    pub completed_perfectly: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    pub fn record_id(student_id: i64, exercise_id: i64) -> String {
        format!("{}:{}", student_id, exercise_id)
    }

    /// Record for a pair that has never been submitted.
    pub fn untouched(student_id: i64, exercise_id: i64) -> Self {
        Self {
            id: Self::record_id(student_id, exercise_id),
            student_id,
            exercise_id,
            state: ProgressState::InProgress,
            attempts: 0,
            score_awarded: 0,
            completed_perfectly: false,
            completed_at: None,
        }
    }
}

/// Dashboard summary derived from the progress list and the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressStats {
    pub student_id: i64,
    pub exercises_attempted: u32,
    pub completed_perfectly: u32,
    pub completed_imperfectly: u32,
    pub total_attempts: u32,
    pub total_score_awarded: u32,
    pub lives: u32,
    pub level: u32,
    pub points_total: u32,
    pub current_streak: u32,
    pub max_streak: u32,
}
