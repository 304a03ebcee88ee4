use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;

/// GET /api/health
///
/// Liveness only; does not touch the database.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "time": Utc::now().naive_utc() })),
    )
}
