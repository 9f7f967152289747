//! Webhook HTTP routes
//!
//! - `POST /trigger/:category` - queue an ad-hoc reconciliation
//! - `GET /health` - liveness check

pub mod health;
pub mod trigger;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::queue::JobQueue;

pub use health::health_router;
pub use trigger::{trigger_router, TriggerState};

/// Build the full webhook application
pub fn app_router(queue: JobQueue) -> Router {
    Router::new()
        .merge(health_router())
        .merge(trigger_router(TriggerState::new(queue)))
        .layer(TraceLayer::new_for_http())
}
