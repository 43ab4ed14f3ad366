use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{CourseCatalog, LearningStore, ProgressStore, StudentStore};
use crate::models::{exercise::Exercise, progress::ProgressRecord, student::Student};

#[derive(Default)]
struct Tables {
    students: HashMap<i64, Student>,
    exercises: HashMap<i64, Exercise>,
    progress: HashMap<(i64, i64), ProgressRecord>,
}

/// Students and catalog entries loaded into a [`MemoryStore`] at startup.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// In-process store. All tables sit behind one lock, which is what makes
/// `commit_submission` atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON seed file of the form
    /// `{ "students": [...], "exercises": [...] }`.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed: SeedData = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

        let store = Self::new();
        let (students, exercises) = store.seed(seed).await;
        tracing::info!(
            students,
            exercises,
            "Seeded in-memory store from {}",
            path.display()
        );
        Ok(store)
    }

    /// Inserts every seeded row under one write lock. Returns the number of
    /// students and exercises now present.
    pub async fn seed(&self, seed: SeedData) -> (usize, usize) {
        let mut tables = self.tables.write().await;
        for student in seed.students {
            tables.students.insert(student.id, student);
        }
        for exercise in seed.exercises {
            tables.exercises.insert(exercise.id, exercise);
        }
        (tables.students.len(), tables.exercises.len())
    }

    pub async fn insert_student(&self, student: Student) {
        self.tables
            .write()
            .await
            .students
            .insert(student.id, student);
    }

    pub async fn insert_exercise(&self, exercise: Exercise) {
        self.tables
            .write()
            .await
            .exercises
            .insert(exercise.id, exercise);
    }
}

#[async_trait]
impl CourseCatalog for MemoryStore {
    async fn get_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        Ok(self.tables.read().await.exercises.get(&exercise_id).cloned())
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn get_student(&self, student_id: i64) -> Result<Option<Student>> {
        Ok(self.tables.read().await.students.get(&student_id).cloned())
    }

    async fn save_student(&self, student: &Student) -> Result<()> {
        self.tables
            .write()
            .await
            .students
            .insert(student.id, student.clone());
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_progress_record(
        &self,
        student_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ProgressRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .progress
            .get(&(student_id, exercise_id))
            .cloned())
    }

    async fn upsert_progress_record(&self, record: &ProgressRecord) -> Result<()> {
        self.tables
            .write()
            .await
            .progress
            .insert((record.student_id, record.exercise_id), record.clone());
        Ok(())
    }

    async fn list_progress(&self, student_id: i64) -> Result<Vec<ProgressRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<ProgressRecord> = tables
            .progress
            .values()
            .filter(|record| record.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.exercise_id);
        Ok(records)
    }
}

#[async_trait]
impl LearningStore for MemoryStore {
    async fn commit_submission(&self, student: &Student, record: &ProgressRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .progress
            .insert((record.student_id, record.exercise_id), record.clone());
        tables.students.insert(student.id, student.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
