//! Pure scoring of submissions against an exercise's answer key.
//!
//! Each exercise kind implements [`Gradeable`]; [`grade`] decodes the raw
//! answer payload into the kind's submission type and dispatches on the
//! exercise content tag. Nothing here reads a clock or touches storage.

mod diagram;
mod match_pairs;
mod multiple_choice;
mod word_search;

use serde::de::DeserializeOwned;

use crate::models::exercise::{Exercise, ExerciseContent};

pub use word_search::{find_word, read_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub awarded: u32,
    pub point_value: u32,
    pub correct: u32,
    pub total: u32,
}

impl Score {
    /// `round(correct / total * point_value)` with halves rounded up, in
    /// integer arithmetic. Zero gradable items score zero.
    pub fn from_ratio(correct: u32, total: u32, point_value: u32) -> Self {
        let awarded = if total == 0 {
            0
        } else {
            let correct = u64::from(correct.min(total));
            let total = u64::from(total);
            let point_value = u64::from(point_value);
            ((2 * correct * point_value + total) / (2 * total)) as u32
        };

        Self {
            awarded,
            point_value,
            correct,
            total,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.awarded == self.point_value
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GradeError {
    #[error("Answer payload does not fit a {kind} exercise: {reason}")]
    Malformed { kind: &'static str, reason: String },

    #[error("Invalid answer: {0}")]
    Invalid(String),
}

/// Common grading contract for every exercise kind.
pub trait Gradeable {
    type Submission: DeserializeOwned;

    fn grade(&self, submission: &Self::Submission, point_value: u32) -> Result<Score, GradeError>;
}

pub fn grade(exercise: &Exercise, answer_payload: &serde_json::Value) -> Result<Score, GradeError> {
    let kind = exercise.kind().as_str();
    match &exercise.content {
        ExerciseContent::MatchPairs(def) => run(def, kind, answer_payload, exercise.point_value),
        ExerciseContent::WordSearch(def) => run(def, kind, answer_payload, exercise.point_value),
        ExerciseContent::MultipleChoice(def) => {
            run(def, kind, answer_payload, exercise.point_value)
        }
        ExerciseContent::DiagramPlacement(def) => {
            run(def, kind, answer_payload, exercise.point_value)
        }
    }
}

fn run<G: Gradeable>(
    definition: &G,
    kind: &'static str,
    answer_payload: &serde_json::Value,
    point_value: u32,
) -> Result<Score, GradeError> {
    let submission: G::Submission =
        serde_json::from_value(answer_payload.clone()).map_err(|e| GradeError::Malformed {
            kind,
            reason: e.to_string(),
        })?;
    definition.grade(&submission, point_value)
}
