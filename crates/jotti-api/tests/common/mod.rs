//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use jotti_core::repository::EventRepository;
use jotti_event_store::memory_event_repository::InMemoryEventRepository;
use jotti_table::domain::schema::SchemaRegistry;
use jotti_test_support::{FixedClock, SequenceIdGenerator, fixed_now};
use tower::ServiceExt;
use uuid::Uuid;

use jotti_api::routes;
use jotti_api::state::AppState;

/// Ids handed out, in order, to orders and payments created by a test app.
pub fn test_ids() -> Vec<Uuid> {
    (1..=16_u128).map(Uuid::from_u128).collect()
}

/// Build the full app router over `event_repository` with a fixed clock and
/// the ids of [`test_ids`]. Uses the same route structure as `main.rs`.
pub fn build_test_app_with(event_repository: Arc<dyn EventRepository>) -> Router {
    let app_state = AppState::new(
        Arc::new(FixedClock(fixed_now())),
        Arc::new(SequenceIdGenerator::new(test_ids())),
        event_repository,
        SchemaRegistry::table_v1(),
    );
    routes::api_router().with_state(app_state)
}

/// Build the full app router over a fresh in-memory event log, and return
/// the log so tests can inspect or seed it.
pub fn build_test_app() -> (Router, InMemoryEventRepository) {
    let log = InMemoryEventRepository::new();
    (build_test_app_with(Arc::new(log.clone())), log)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
