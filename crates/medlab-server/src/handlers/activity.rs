use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_db_mysql::queries::activity;
use serde::Deserialize;

use crate::handlers::read_err;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/activity?limit=50
pub async fn list_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = activity::list_activity(&state.pool, params.limit)
        .await
        .map_err(read_err)?;
    Ok(Json(rows))
}
