//! Persistence seams used by the progress recorder.
//!
//! The catalog is read-only; students and progress records are written
//! together through [`LearningStore::commit_submission`] so that a graded
//! submission lands as one unit or not at all.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{exercise::Exercise, progress::ProgressRecord, student::Student};

pub mod memory;
pub mod mongo;

pub use memory::{MemoryStore, SeedData};
pub use mongo::MongoStore;

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn get_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn get_student(&self, student_id: i64) -> Result<Option<Student>>;

    async fn save_student(&self, student: &Student) -> Result<()>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress_record(
        &self,
        student_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ProgressRecord>>;

    async fn upsert_progress_record(&self, record: &ProgressRecord) -> Result<()>;

    async fn list_progress(&self, student_id: i64) -> Result<Vec<ProgressRecord>>;
}

#[async_trait]
pub trait LearningStore: CourseCatalog + StudentStore + ProgressStore {
    /// Writes the progress record and the student in one transaction.
    async fn commit_submission(&self, student: &Student, record: &ProgressRecord) -> Result<()>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
