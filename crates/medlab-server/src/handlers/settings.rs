use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_db_mysql::queries::settings;
use serde_json::json;

use crate::handlers::{read_err, write_err};
use crate::server::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let map = settings::get_settings(&state.pool)
        .await
        .map_err(read_err)?;
    Ok(Json(json!({ "settings": map })))
}

/// PUT /api/settings
///
/// Accepts a flat string map and upserts every pair.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    settings::upsert_settings(&state.pool, &req)
        .await
        .map_err(write_err)?;
    Ok(Json(json!({ "status": "ok" })))
}
