use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, ReplaceOptions},
    Client, ClientSession, Collection, Database,
};

use super::{CourseCatalog, LearningStore, ProgressStore, StudentStore};
use crate::metrics::track_db_operation;
use crate::models::{exercise::Exercise, progress::ProgressRecord, student::Student};

const STUDENTS: &str = "students";
const EXERCISES: &str = "exercises";
const PROGRESS: &str = "progress_records";

/// MongoDB-backed store. Submissions commit inside a multi-document
/// transaction, so the deployment has to be a replica set.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, db: Database) -> Self {
        Self { client, db }
    }

    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to connect to MongoDB")?;
        let db = client.database(database);
        tracing::info!("MongoDB connected, database={}", database);
        Ok(Self::new(client, db))
    }

    fn students(&self) -> Collection<Student> {
        self.db.collection(STUDENTS)
    }

    fn exercises(&self) -> Collection<Exercise> {
        self.db.collection(EXERCISES)
    }

    fn progress(&self) -> Collection<ProgressRecord> {
        self.db.collection(PROGRESS)
    }

    fn upsert() -> ReplaceOptions {
        ReplaceOptions::builder().upsert(true).build()
    }

    async fn write_submission(
        &self,
        session: &mut ClientSession,
        student: &Student,
        record: &ProgressRecord,
    ) -> Result<()> {
        self.progress()
            .replace_one(doc! { "_id": &record.id }, record)
            .with_options(Self::upsert())
            .session(&mut *session)
            .await
            .context("Failed to upsert progress record")?;

        self.students()
            .replace_one(doc! { "_id": student.id }, student)
            .with_options(Self::upsert())
            .session(&mut *session)
            .await
            .context("Failed to save student")?;

        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for MongoStore {
    async fn get_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        track_db_operation("find_one", EXERCISES, async {
            self.exercises()
                .find_one(doc! { "_id": exercise_id })
                .await
                .context("Failed to query exercises collection")
        })
        .await
    }
}

#[async_trait]
impl StudentStore for MongoStore {
    async fn get_student(&self, student_id: i64) -> Result<Option<Student>> {
        track_db_operation("find_one", STUDENTS, async {
            self.students()
                .find_one(doc! { "_id": student_id })
                .await
                .context("Failed to query students collection")
        })
        .await
    }

    async fn save_student(&self, student: &Student) -> Result<()> {
        track_db_operation("replace_one", STUDENTS, async {
            self.students()
                .replace_one(doc! { "_id": student.id }, student)
                .with_options(Self::upsert())
                .await
                .context("Failed to save student")?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ProgressStore for MongoStore {
    async fn get_progress_record(
        &self,
        student_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ProgressRecord>> {
        let id = ProgressRecord::record_id(student_id, exercise_id);
        track_db_operation("find_one", PROGRESS, async {
            self.progress()
                .find_one(doc! { "_id": &id })
                .await
                .context("Failed to query progress records")
        })
        .await
    }

    async fn upsert_progress_record(&self, record: &ProgressRecord) -> Result<()> {
        track_db_operation("replace_one", PROGRESS, async {
            self.progress()
                .replace_one(doc! { "_id": &record.id }, record)
                .with_options(Self::upsert())
                .await
                .context("Failed to upsert progress record")?;
            Ok(())
        })
        .await
    }

    async fn list_progress(&self, student_id: i64) -> Result<Vec<ProgressRecord>> {
        track_db_operation("find", PROGRESS, async {
            let options = FindOptions::builder()
                .sort(doc! { "exercise_id": 1 })
                .build();
            let cursor = self
                .progress()
                .find(doc! { "student_id": student_id })
                .with_options(options)
                .await
                .context("Failed to query progress records")?;
            cursor
                .try_collect::<Vec<ProgressRecord>>()
                .await
                .context("Progress cursor error")
        })
        .await
    }
}

#[async_trait]
impl LearningStore for MongoStore {
    async fn commit_submission(&self, student: &Student, record: &ProgressRecord) -> Result<()> {
        track_db_operation("commit_submission", PROGRESS, async {
            let mut session = self
                .client
                .start_session()
                .await
                .context("Failed to start MongoDB session")?;
            session
                .start_transaction()
                .await
                .context("Failed to start transaction")?;

            if let Err(err) = self.write_submission(&mut session, student, record).await {
                if let Err(abort_err) = session.abort_transaction().await {
                    tracing::error!("Failed to abort submission transaction: {}", abort_err);
                }
                return Err(err);
            }

            session
                .commit_transaction()
                .await
                .context("Failed to commit submission transaction")?;
            tracing::debug!(
                "Committed submission: student={}, exercise={}",
                record.student_id,
                record.exercise_id
            );
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            self.db.run_command(doc! { "ping": 1 }),
        )
        .await
        .map_err(|_| anyhow::anyhow!("MongoDB timeout after 1s"))?
        .context("MongoDB ping failed")?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
