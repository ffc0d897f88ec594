use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Does not call the provider.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "vision-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
