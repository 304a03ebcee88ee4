use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_db_mysql::queries::doctors::{self, NewDoctor};
use serde::Deserialize;

use crate::handlers::{read_err, write_err};
use crate::server::AppState;

/// Payload for POST /api/doctors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub full_name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /api/doctors
pub async fn list_doctors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = doctors::list_doctors(&state.pool).await.map_err(read_err)?;
    Ok(Json(rows))
}

/// POST /api/doctors
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(req): Json<CreateDoctorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.full_name.trim().is_empty() {
        return Err(ApiError::bad_request("fullName is required"));
    }

    let doctor = NewDoctor {
        full_name: req.full_name,
        specialization: req.specialization,
        phone: req.phone,
        email: req.email,
    };

    let row = doctors::create_doctor(&state.pool, &doctor)
        .await
        .map_err(write_err)?;
    Ok(Json(row))
}
