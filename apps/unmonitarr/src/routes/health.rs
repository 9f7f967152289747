//! Health check route

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};

/// Create health check router
pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}

/// Liveness check; always succeeds while the server is running
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "unmonitarr",
        })),
    )
}
