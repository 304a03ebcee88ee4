use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_db_mysql::queries::dashboard;

use crate::handlers::read_err;
use crate::server::AppState;

/// GET /api/dashboard
///
/// Counters plus a dense seven-day order series ending today.
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let payload = dashboard::dashboard(&state.pool).await.map_err(read_err)?;
    Ok(Json(payload))
}
