use chrono::{DateTime, Duration, Utc};

use crate::models::student::{Student, DEFAULT_LIVES};
use crate::utils::time::minutes_ceil;

pub const LOCKOUT_MINUTES: i64 = 60;
pub const LEVEL_THRESHOLD: u32 = 100;

/// Tunables for lives, cooldown and levelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    pub max_lives: u32,
    pub lockout: Duration,
    pub level_threshold: u32,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            max_lives: DEFAULT_LIVES,
            lockout: Duration::minutes(LOCKOUT_MINUTES),
            level_threshold: LEVEL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutStatus {
    pub locked: bool,
    pub remaining: Duration,
    /// The cooldown elapsed during this check and a life was handed back.
    pub released: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("No lives left, wait {} minutes", wait_minutes(.remaining))]
    Locked { remaining: Duration },
}

pub(crate) fn wait_minutes(remaining: &Duration) -> i64 {
    minutes_ceil(*remaining)
}

/// Result of grading, as far as the ledger cares.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub point_value: u32,
    pub score_awarded: u32,
    pub perfect: bool,
}

#[derive(Debug, Clone)]
pub struct AppliedOutcome {
    pub student: Student,
    pub life_lost: bool,
    pub locked_out: bool,
    pub levels_gained: u32,
}

/// Gatekeeper for a student's lives, points and level.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    policy: LedgerPolicy,
}

impl ResourceLedger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    /// Reports the lockout state, releasing it in place once the cooldown has
    /// elapsed. Calling it again after a release is a no-op.
    pub fn check_lockout(&self, student: &mut Student, now: DateTime<Utc>) -> LockoutStatus {
        if student.lives > 0 {
            // lives and the lockout timestamp must agree
            student.lockout_started_at = None;
            return LockoutStatus {
                locked: false,
                remaining: Duration::zero(),
                released: false,
            };
        }

        let remaining = self.remaining(student, now);
        if remaining > Duration::zero() {
            return LockoutStatus {
                locked: true,
                remaining,
                released: false,
            };
        }

        student.lives = 1;
        student.lockout_started_at = None;
        tracing::info!(student_id = student.id, "Lockout expired, one life restored");

        LockoutStatus {
            locked: false,
            remaining: Duration::zero(),
            released: true,
        }
    }

    /// Time left on the cooldown without touching the student.
    pub fn remaining(&self, student: &Student, now: DateTime<Utc>) -> Duration {
        if student.lives > 0 {
            return Duration::zero();
        }
        match student.lockout_started_at {
            Some(started) => {
                let elapsed = (now - started).max(Duration::zero());
                (self.policy.lockout - elapsed).max(Duration::zero())
            }
            // no start recorded: nothing to wait for
            None => Duration::zero(),
        }
    }

    /// Applies one graded submission and returns the updated student. The input
    /// is left untouched, so a failure here never leaves half an update behind.
    pub fn apply_outcome(
        &self,
        student: &Student,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<AppliedOutcome, LedgerError> {
        if student.is_out_of_lives() {
            return Err(LedgerError::Locked {
                remaining: self.remaining(student, now),
            });
        }

        let mut next = student.clone();
        next.lives = next.lives.min(self.policy.max_lives);

        let mut life_lost = false;
        let mut locked_out = false;
        if !outcome.perfect {
            next.lives = next.lives.saturating_sub(1);
            life_lost = true;
            if next.lives == 0 {
                next.lockout_started_at = Some(now);
                locked_out = true;
            }
        }

        if outcome.score_awarded > 0 {
            next.points_total = next.points_total.saturating_add(outcome.point_value);
        }

        let mut levels_gained = 0;
        if self.policy.level_threshold > 0 {
            while next.points_total >= self.policy.level_threshold {
                next.level += 1;
                next.points_total -= self.policy.level_threshold;
                levels_gained += 1;
            }
        }

        record_activity(&mut next, now);

        Ok(AppliedOutcome {
            student: next,
            life_lost,
            locked_out,
            levels_gained,
        })
    }
}

/// Daily streak: same day keeps it, the next day extends it, a gap restarts it.
fn record_activity(student: &mut Student, now: DateTime<Utc>) {
    let today = now.date_naive();
    student.current_streak = match student.last_activity_at.map(|t| t.date_naive()) {
        Some(day) if day == today => student.current_streak.max(1),
        Some(day) if day.succ_opt() == Some(today) => student.current_streak + 1,
        _ => 1,
    };
    student.max_streak = student.max_streak.max(student.current_streak);
    student.last_activity_at = Some(now);
}
