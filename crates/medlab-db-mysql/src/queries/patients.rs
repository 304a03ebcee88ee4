//! Patient listing and registration.

use chrono::{DateTime, NaiveDate, Utc};
use medlab_core::Gender;
use serde::Serialize;
use sqlx_core::row::Row;
use sqlx_mysql::{MySqlPool, MySqlRow};
use tracing::instrument;

use crate::error::Result;
use crate::queries::activity;

/// A patient as stored. Gender stays in the stored `M`/`F`/`O` coding.
#[derive(Debug, Clone, Serialize)]
pub struct PatientRow {
    pub patient_id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when registering a patient.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

const PATIENT_COLUMNS: &str =
    "patient_id, full_name, date_of_birth, gender, phone, email, address, created_at";

fn patient_from_row(row: &MySqlRow) -> Result<PatientRow> {
    Ok(PatientRow {
        patient_id: row.try_get("patient_id")?,
        full_name: row.try_get("full_name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: row.try_get("gender")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Lists all patients, newest first.
#[instrument(skip(pool))]
pub async fn list_patients(pool: &MySqlPool) -> Result<Vec<PatientRow>> {
    let sql = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, patient_id DESC"
    );
    let rows = sqlx_core::query::query(&sql).fetch_all(pool).await?;

    rows.iter().map(patient_from_row).collect()
}

/// Registers a patient and logs the mutation in one transaction. Returns
/// the stored row.
#[instrument(skip(pool, patient), fields(full_name = %patient.full_name))]
pub async fn create_patient(pool: &MySqlPool, patient: &NewPatient) -> Result<PatientRow> {
    let mut tx = pool.begin().await?;

    let result = sqlx_core::query::query(
        r#"INSERT INTO patients (full_name, date_of_birth, gender, phone, email, address)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&patient.full_name)
    .bind(patient.date_of_birth)
    .bind(patient.gender.map(|g| g.as_db()))
    .bind(&patient.phone)
    .bind(&patient.email)
    .bind(&patient.address)
    .execute(&mut *tx)
    .await?;

    let patient_id = result.last_insert_id() as i64;

    activity::record(
        &mut tx,
        "CREATE_PATIENT",
        "PATIENT",
        Some(patient_id),
        "New patient created",
    )
    .await?;

    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?");
    let row = sqlx_core::query::query(&sql)
        .bind(patient_id)
        .fetch_one(&mut *tx)
        .await?;
    let created = patient_from_row(&row)?;

    tx.commit().await?;

    Ok(created)
}
