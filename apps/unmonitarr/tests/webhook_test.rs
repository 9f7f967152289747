//! Integration tests for the webhook routes
//!
//! Drives the full router with `oneshot` and checks what lands in the queue.

use axum::{body::Body, http::Method, http::Request, http::StatusCode, Router};
use serde_json::{json, Value};
use tower::ServiceExt;
use unmonitarr::routes::app_router;
use unmonitarr::{Category, Job, JobQueue, Trigger};

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_trigger_radarr_queues_movies_job() {
    let queue = JobQueue::new();
    let (status, body) = send(app_router(queue.clone()), post("/trigger/radarr")).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({"status": "queued", "job": "radarr"}));
    assert_eq!(
        queue.try_dequeue(),
        Some(Job::new(Category::Movies, Trigger::Webhook))
    );
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_trigger_sonarr_queues_series_job() {
    let queue = JobQueue::new();
    let (status, body) = send(app_router(queue.clone()), post("/trigger/sonarr")).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({"status": "queued", "job": "sonarr"}));
    assert_eq!(
        queue.try_dequeue(),
        Some(Job::new(Category::Series, Trigger::Webhook))
    );
}

#[tokio::test]
async fn test_repeated_triggers_are_not_deduplicated() {
    let queue = JobQueue::new();
    let app = app_router(queue.clone());

    for _ in 0..3 {
        let (status, _) = send(app.clone(), post("/trigger/sonarr")).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
    assert_eq!(queue.len(), 3);
}

#[tokio::test]
async fn test_unknown_category_is_rejected() {
    let queue = JobQueue::new();
    let (status, body) = send(app_router(queue.clone()), post("/trigger/lidarr")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "unknown category: lidarr"}));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_trigger_requires_post() {
    let queue = JobQueue::new();
    let request = Request::builder()
        .uri("/trigger/radarr")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app_router(queue.clone()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_router(JobQueue::new()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "unmonitarr"}));
}
