use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::*;
use edunow_progress::{
    config::Config, create_router, services::AppState, storage::MemoryStore,
    utils::time::ManualClock,
};

const BUNDLED_SEED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/seed.json");

async fn create_seeded_app() -> axum::Router {
    let store = MemoryStore::from_seed_file(BUNDLED_SEED)
        .await
        .expect("bundled seed should load");
    let clock = Arc::new(ManualClock::new(start_time()));
    let state = AppState::with_clock(Config::default(), Arc::new(store), clock);
    create_router(Arc::new(state))
}

#[tokio::test]
async fn test_bundled_seed_serves_the_demo_student() {
    let router = create_seeded_app().await;

    let (status, body) = get_json(&router, "/api/v1/students/1/lives").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lives"], 4);

    let (status, _) = get_json(&router, "/api/v1/students/2/lives").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bundled_seed_exercises_can_be_graded() {
    let router = create_seeded_app().await;

    let (status, body) = post_json(
        &router,
        "/api/v1/submissions",
        submission(
            1,
            2,
            json!({
                "selections": [
                    [{ "row": 0, "col": 0 }, { "row": 0, "col": 1 }, { "row": 0, "col": 2 }, { "row": 0, "col": 3 }, { "row": 0, "col": 4 }],
                    [{ "row": 1, "col": 0 }, { "row": 1, "col": 1 }, { "row": 1, "col": 2 }, { "row": 1, "col": 3 }],
                    [{ "row": 3, "col": 0 }, { "row": 3, "col": 1 }, { "row": 3, "col": 2 }, { "row": 3, "col": 3 }, { "row": 3, "col": 4 }]
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["score"], 30);
    assert_eq!(body["completed_perfectly"], true);

    let (status, body) = post_json(
        &router,
        "/api/v1/submissions",
        submission(
            1,
            4,
            json!({ "placements": { "p1": "cell wall", "p2": "Nucleus", "p3": "nucleus" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    // 2 of 3 placeholders, 10 * 2 / 3 rounds to 7
    assert_eq!(body["score"], 7);
    assert_eq!(body["lives"], 3);
}
