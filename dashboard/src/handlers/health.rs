use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe; does not touch GitHub
#[tracing::instrument]
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
