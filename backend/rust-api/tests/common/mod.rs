#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use edunow_progress::{
    config::Config,
    create_router,
    models::{exercise::Exercise, progress::ProgressRecord, student::Student},
    services::AppState,
    storage::{CourseCatalog, LearningStore, MemoryStore, ProgressStore, StudentStore},
    utils::time::ManualClock,
};

pub const FRESH_STUDENT: i64 = 1;
pub const LAST_LIFE_STUDENT: i64 = 2;
pub const LOCKED_STUDENT: i64 = 3;
pub const NEAR_LEVEL_STUDENT: i64 = 4;

pub const MATCH_EXERCISE: i64 = 10;
pub const CHOICE_EXERCISE: i64 = 11;
pub const WORD_SEARCH_EXERCISE: i64 = 12;
pub const DIAGRAM_EXERCISE: i64 = 13;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub async fn create_test_app() -> TestApp {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    seed_test_data(&store).await;

    let clock = Arc::new(ManualClock::new(start_time()));
    let state = AppState::with_clock(Config::default(), store.clone(), clock.clone());

    TestApp {
        router: create_router(Arc::new(state)),
        store,
        clock,
    }
}

/// App whose store refuses to commit submissions.
pub async fn create_failing_app() -> (Router, Arc<MemoryStore>) {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    seed_test_data(&store).await;

    let failing = Arc::new(FailingCommitStore {
        inner: store.clone(),
    });
    let clock = Arc::new(ManualClock::new(start_time()));
    let state = AppState::with_clock(Config::default(), failing, clock);

    (create_router(Arc::new(state)), store)
}

async fn seed_test_data(store: &MemoryStore) {
    store.insert_student(Student::new(FRESH_STUDENT, "ana")).await;

    let mut last_life = Student::new(LAST_LIFE_STUDENT, "bruno");
    last_life.lives = 1;
    store.insert_student(last_life).await;

    let mut locked = Student::new(LOCKED_STUDENT, "carla");
    locked.lives = 0;
    locked.lockout_started_at = Some(start_time() - Duration::minutes(30));
    store.insert_student(locked).await;

    let mut near_level = Student::new(NEAR_LEVEL_STUDENT, "diego");
    near_level.points_total = 95;
    store.insert_student(near_level).await;

    for exercise in [
        match_pairs_exercise(),
        multiple_choice_exercise(),
        word_search_exercise(),
        diagram_exercise(),
    ] {
        store.insert_exercise(exercise).await;
    }
}

fn exercise(value: Value) -> Exercise {
    serde_json::from_value(value).expect("test exercise should deserialize")
}

fn match_pairs_exercise() -> Exercise {
    exercise(json!({
        "_id": MATCH_EXERCISE,
        "lesson_id": 1,
        "prompt": "Match each organ to its function",
        "point_value": 20,
        "content": {
            "kind": "match_pairs",
            "terms": ["heart", "lungs", "stomach", "kidney", "brain"],
            "definitions": ["pumps blood", "exchange gas", "digests food", "filters blood", "thinks"],
            "answer_key": {
                "heart": "pumps blood",
                "lungs": "exchange gas",
                "stomach": "digests food",
                "kidney": "filters blood",
                "brain": "thinks"
            }
        }
    }))
}

fn multiple_choice_exercise() -> Exercise {
    exercise(json!({
        "_id": CHOICE_EXERCISE,
        "lesson_id": 1,
        "prompt": "Choose the right answer",
        "point_value": 30,
        "content": {
            "kind": "multiple_choice",
            "questions": [
                { "prompt": "2 + 2", "options": ["3", "4", "5"] },
                { "prompt": "Capital of Peru", "options": ["Lima", "Cusco"] },
                { "prompt": "H2O is", "options": ["water", "salt"] }
            ],
            "answer_key": ["4", "Lima", "water"]
        }
    }))
}

fn word_search_exercise() -> Exercise {
    exercise(json!({
        "_id": WORD_SEARCH_EXERCISE,
        "lesson_id": 2,
        "prompt": "Find the eight words",
        "point_value": 40,
        "content": {
            "kind": "word_search",
            "grid": ["CATQ", "DOGQ", "SUNQ", "MAPQ", "PENQ", "CUPQ", "HATQ", "XOBQ"],
            "words": ["cat", "dog", "sun", "map", "pen", "cup", "hat", "box"]
        }
    }))
}

fn diagram_exercise() -> Exercise {
    exercise(json!({
        "_id": DIAGRAM_EXERCISE,
        "lesson_id": 2,
        "prompt": "Label the cell",
        "point_value": 10,
        "content": {
            "kind": "diagram_placement",
            "placeholders": [{ "id": "p1" }, { "id": "p2", "hint": "control centre" }],
            "labels": ["membrane", "nucleus"],
            "answer_key": { "p1": "membrane", "p2": "nucleus" }
        }
    }))
}

/// Selections covering every word of the word search exercise, each read
/// left to right. BOX is spelled backwards in the last grid row.
pub fn all_word_selections() -> Value {
    let selections: Vec<Value> = (0..8)
        .map(|row| json!([{ "row": row, "col": 0 }, { "row": row, "col": 1 }, { "row": row, "col": 2 }]))
        .collect();
    json!({ "selections": selections })
}

pub fn submission(student_id: i64, exercise_id: i64, answer_payload: Value) -> Value {
    json!({
        "student_id": student_id,
        "exercise_id": exercise_id,
        "answer_payload": answer_payload
    })
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_raw(app: &Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!(
                "non-JSON body for status {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

/// Delegates reads to a memory store and fails every commit.
pub struct FailingCommitStore {
    pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl CourseCatalog for FailingCommitStore {
    async fn get_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        self.inner.get_exercise(exercise_id).await
    }
}

#[async_trait]
impl StudentStore for FailingCommitStore {
    async fn get_student(&self, student_id: i64) -> Result<Option<Student>> {
        self.inner.get_student(student_id).await
    }

    async fn save_student(&self, student: &Student) -> Result<()> {
        self.inner.save_student(student).await
    }
}

#[async_trait]
impl ProgressStore for FailingCommitStore {
    async fn get_progress_record(
        &self,
        student_id: i64,
        exercise_id: i64,
    ) -> Result<Option<ProgressRecord>> {
        self.inner.get_progress_record(student_id, exercise_id).await
    }

    async fn upsert_progress_record(&self, record: &ProgressRecord) -> Result<()> {
        self.inner.upsert_progress_record(record).await
    }

    async fn list_progress(&self, student_id: i64) -> Result<Vec<ProgressRecord>> {
        self.inner.list_progress(student_id).await
    }
}

#[async_trait]
impl LearningStore for FailingCommitStore {
    async fn commit_submission(&self, _student: &Student, _record: &ProgressRecord) -> Result<()> {
        anyhow::bail!("simulated write failure")
    }

    async fn ping(&self) -> Result<()> {
        anyhow::bail!("store unavailable")
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
