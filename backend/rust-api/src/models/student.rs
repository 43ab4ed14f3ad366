use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIVES: u32 = 4;

/// A student together with the mutable resource pool the ledger manages.
///
/// `lockout_started_at` is set if and only if `lives == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: i64,
    pub username: String,
    pub lives: u32,
    pub points_total: u32,
    pub level: u32,
    pub lockout_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub max_streak: u32,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Fresh account state: full lives, level 1, no points.
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            lives: DEFAULT_LIVES,
            points_total: 0,
            level: 1,
            lockout_started_at: None,
            current_streak: 0,
            max_streak: 0,
            last_activity_at: None,
        }
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }
}

/// Snapshot served to the UI when it polls lives and the lockout countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivesStatus {
    pub student_id: i64,
    pub lives: u32,
    pub max_lives: u32,
    pub locked: bool,
    pub lockout_remaining_ms: Option<i64>,
    pub level: u32,
    pub points_total: u32,
    pub current_streak: u32,
    pub max_streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_student_starts_with_full_lives() {
        let student = Student::new(1, "demo");
        assert_eq!(student.lives, DEFAULT_LIVES);
        assert_eq!(student.level, 1);
        assert_eq!(student.points_total, 0);
        assert!(student.lockout_started_at.is_none());
        assert!(!student.is_out_of_lives());
    }

    #[test]
    fn streak_fields_default_when_missing() {
        let json = serde_json::json!({
            "_id": 7,
            "username": "legacy",
            "lives": 2,
            "points_total": 40,
            "level": 3,
            "lockout_started_at": null
        });
        let student: Student = serde_json::from_value(json).unwrap();
        assert_eq!(student.current_streak, 0);
        assert_eq!(student.max_streak, 0);
        assert!(student.last_activity_at.is_none());
    }
}
