use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use medlab_api::ApiError;
use medlab_core::Gender;
use medlab_db_mysql::queries::patients::{self, NewPatient};
use serde::Deserialize;

use crate::handlers::{parse_date_opt, read_err, write_err};
use crate::server::AppState;

/// Payload for POST /api/patients.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// GET /api/patients
pub async fn list_patients(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = patients::list_patients(&state.pool)
        .await
        .map_err(read_err)?;
    Ok(Json(rows))
}

/// POST /api/patients
pub async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.full_name.trim().is_empty() {
        return Err(ApiError::bad_request("fullName is required"));
    }

    let patient = NewPatient {
        full_name: req.full_name,
        date_of_birth: parse_date_opt(req.date_of_birth.as_deref())?,
        gender: req.gender.as_deref().and_then(Gender::from_external),
        phone: req.phone,
        email: req.email,
        address: req.address,
    };

    let row = patients::create_patient(&state.pool, &patient)
        .await
        .map_err(write_err)?;
    Ok(Json(row))
}
