//! Webhook trigger route
//!
//! Catalog services call `POST /trigger/radarr` or `POST /trigger/sonarr`
//! (for example from a "download" or "series add" connection). The job is
//! queued and acknowledged immediately; the outcome only shows up in logs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::queue::{Category, Job, JobQueue, Trigger};

/// Shared state for trigger handlers
#[derive(Clone)]
pub struct TriggerState {
    pub queue: JobQueue,
}

impl TriggerState {
    pub fn new(queue: JobQueue) -> Self {
        Self { queue }
    }
}

#[derive(Debug, Serialize)]
struct Queued {
    status: &'static str,
    job: &'static str,
}

/// Create trigger router
pub fn trigger_router(state: TriggerState) -> Router {
    Router::new()
        .route("/trigger/:category", post(trigger))
        .with_state(state)
}

async fn trigger(State(state): State<TriggerState>, Path(category): Path<String>) -> Response {
    match category.parse::<Category>() {
        Ok(category) => {
            tracing::info!(%category, "Trigger received via webhook");
            state.queue.enqueue(Job::new(category, Trigger::Webhook));
            (
                StatusCode::ACCEPTED,
                Json(Queued {
                    status: "queued",
                    job: category.as_str(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(category = %category, "Rejected trigger for unknown category");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
