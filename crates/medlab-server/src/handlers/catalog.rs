use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_db_mysql::queries::catalog;

use crate::handlers::read_err;
use crate::server::AppState;

/// GET /api/tests
///
/// Active tests with category names and per-gender range display strings.
pub async fn list_tests(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = catalog::list_active_tests(&state.pool)
        .await
        .map_err(read_err)?;
    Ok(Json(rows))
}
