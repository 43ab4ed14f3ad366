use std::sync::Arc;

use chrono::Duration;

use super::grader::{self, GradeError};
use super::ledger::{wait_minutes, LedgerError, Outcome, ResourceLedger};
use super::locks::StudentLocks;
use crate::metrics::{record_submission, LEVEL_UPS_TOTAL, LIVES_RESTORED_TOTAL, LOCKOUTS_TOTAL};
use crate::models::{
    progress::{ProgressRecord, ProgressState, ProgressStats},
    student::{LivesStatus, Student},
    submission::SubmissionResult,
};
use crate::storage::{CourseCatalog, LearningStore, ProgressStore, StudentStore};
use crate::utils::time::{minutes_ceil, Clock};

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("No lives left, wait {} minutes", wait_minutes(.remaining))]
    Locked { remaining: Duration },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl SubmissionError {
    pub fn lockout_remaining_ms(&self) -> Option<i64> {
        match self {
            SubmissionError::Locked { remaining } => Some(remaining.num_milliseconds()),
            _ => None,
        }
    }
}

impl From<GradeError> for SubmissionError {
    fn from(err: GradeError) -> Self {
        SubmissionError::Validation(err.to_string())
    }
}

impl From<LedgerError> for SubmissionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Locked { remaining } => SubmissionError::Locked { remaining },
        }
    }
}

/// Runs a submission end to end: lockout gate, grading, progress upsert and
/// ledger update, committed together.
pub struct ProgressRecorder {
    store: Arc<dyn LearningStore>,
    ledger: ResourceLedger,
    clock: Arc<dyn Clock>,
    locks: StudentLocks,
}

impl ProgressRecorder {
    pub fn new(store: Arc<dyn LearningStore>, ledger: ResourceLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            ledger,
            clock,
            locks: StudentLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn LearningStore> {
        &self.store
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub async fn submit(
        &self,
        student_id: i64,
        exercise_id: i64,
        answer_payload: &serde_json::Value,
    ) -> Result<SubmissionResult, SubmissionError> {
        tracing::info!(
            "Processing submission: student={}, exercise={}",
            student_id,
            exercise_id
        );

        let _guard = self.locks.acquire(student_id).await;
        let now = self.clock.now();

        let mut student = self.load_student(student_id).await?;
        let exercise = self
            .store
            .get_exercise(exercise_id)
            .await?
            .ok_or(SubmissionError::NotFound {
                entity: "Exercise",
                id: exercise_id,
            })?;
        let kind = exercise.kind().as_str();

        let lockout = self.ledger.check_lockout(&mut student, now);
        if lockout.locked {
            tracing::warn!(
                "Submission rejected, student {} is locked out for {} more minutes",
                student_id,
                minutes_ceil(lockout.remaining)
            );
            record_submission(kind, "locked");
            return Err(SubmissionError::Locked {
                remaining: lockout.remaining,
            });
        }
        if lockout.released {
            LIVES_RESTORED_TOTAL.inc();
        }

        let score = grader::grade(&exercise, answer_payload).map_err(|err| {
            tracing::warn!(
                "Rejected answer payload: student={}, exercise={}, error={}",
                student_id,
                exercise_id,
                err
            );
            record_submission(kind, "rejected");
            SubmissionError::from(err)
        })?;
        let perfect = score.is_perfect();

        let previous = self
            .store
            .get_progress_record(student_id, exercise_id)
            .await?
            .unwrap_or_else(|| ProgressRecord::untouched(student_id, exercise_id));
        let record = ProgressRecord {
            state: ProgressState::Completed,
            attempts: previous.attempts + 1,
            score_awarded: score.awarded,
            completed_perfectly: perfect,
            completed_at: Some(now),
            ..previous
        };

        let applied = self.ledger.apply_outcome(
            &student,
            Outcome {
                point_value: exercise.point_value,
                score_awarded: score.awarded,
                perfect,
            },
            now,
        )?;

        self.store
            .commit_submission(&applied.student, &record)
            .await?;

        record_submission(kind, if perfect { "perfect" } else { "imperfect" });
        if applied.locked_out {
            LOCKOUTS_TOTAL.inc();
            tracing::warn!("Student {} ran out of lives", student_id);
        }
        if applied.levels_gained > 0 {
            LEVEL_UPS_TOTAL.inc_by(u64::from(applied.levels_gained));
            tracing::info!(
                "Student {} reached level {}",
                student_id,
                applied.student.level
            );
        }

        tracing::info!(
            "Submission recorded: student={}, exercise={}, score={}/{}, lives={}, level={}",
            student_id,
            exercise_id,
            score.awarded,
            exercise.point_value,
            applied.student.lives,
            applied.student.level
        );

        let lockout_remaining_ms = applied
            .locked_out
            .then(|| self.ledger.policy().lockout.num_milliseconds());

        Ok(SubmissionResult {
            score: score.awarded,
            point_value: exercise.point_value,
            completed_perfectly: perfect,
            locked_out: applied.locked_out,
            lockout_remaining_ms,
            lives: applied.student.lives,
            level: applied.student.level,
            points_total: applied.student.points_total,
            attempts: record.attempts,
        })
    }

    /// Lives and lockout countdown for UI polling. Persists the student only
    /// when the cooldown has just elapsed.
    pub async fn lives_status(&self, student_id: i64) -> Result<LivesStatus, SubmissionError> {
        let _guard = self.locks.acquire(student_id).await;
        let now = self.clock.now();

        let mut student = self.load_student(student_id).await?;
        let lockout = self.ledger.check_lockout(&mut student, now);
        if lockout.released {
            self.store.save_student(&student).await?;
            LIVES_RESTORED_TOTAL.inc();
        }

        Ok(LivesStatus {
            student_id,
            lives: student.lives,
            max_lives: self.ledger.policy().max_lives,
            locked: lockout.locked,
            lockout_remaining_ms: lockout
                .locked
                .then(|| lockout.remaining.num_milliseconds()),
            level: student.level,
            points_total: student.points_total,
            current_streak: student.current_streak,
            max_streak: student.max_streak,
        })
    }

    pub async fn list_progress(
        &self,
        student_id: i64,
    ) -> Result<Vec<ProgressRecord>, SubmissionError> {
        self.load_student(student_id).await?;
        Ok(self.store.list_progress(student_id).await?)
    }

    pub async fn stats(&self, student_id: i64) -> Result<ProgressStats, SubmissionError> {
        let student = self.load_student(student_id).await?;
        let records = self.store.list_progress(student_id).await?;
        Ok(summarize(&student, &records))
    }

    async fn load_student(&self, student_id: i64) -> Result<Student, SubmissionError> {
        self.store
            .get_student(student_id)
            .await?
            .ok_or(SubmissionError::NotFound {
                entity: "Student",
                id: student_id,
            })
    }
}

fn summarize(student: &Student, records: &[ProgressRecord]) -> ProgressStats {
    let attempted: Vec<&ProgressRecord> =
        records.iter().filter(|record| record.attempts > 0).collect();
    let completed_perfectly = attempted
        .iter()
        .filter(|record| record.completed_perfectly)
        .count() as u32;

    ProgressStats {
        student_id: student.id,
        exercises_attempted: attempted.len() as u32,
        completed_perfectly,
        completed_imperfectly: attempted.len() as u32 - completed_perfectly,
        total_attempts: attempted.iter().map(|record| record.attempts).sum(),
        total_score_awarded: attempted.iter().map(|record| record.score_awarded).sum(),
        lives: student.lives,
        level: student.level,
        points_total: student.points_total,
        current_streak: student.current_streak,
        max_streak: student.max_streak,
    }
}
