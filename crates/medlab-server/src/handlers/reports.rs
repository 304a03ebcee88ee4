use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_db_mysql::queries::reports;

use crate::handlers::read_err;
use crate::server::AppState;

/// GET /api/reports
///
/// Orders whose report is ready, newest first.
pub async fn list_reports(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = reports::list_completed(&state.pool)
        .await
        .map_err(read_err)?;
    Ok(Json(rows))
}
