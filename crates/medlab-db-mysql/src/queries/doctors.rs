//! Doctor listing and registration.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx_mysql::MySqlPool;
use tracing::instrument;

use crate::error::Result;
use crate::queries::activity;

/// A referring doctor as stored.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorRow {
    pub doctor_id: i64,
    pub full_name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when registering a doctor.
#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub full_name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

type DoctorTuple = (
    i64,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

fn doctor_from_tuple(
    (doctor_id, full_name, specialization, phone, email, created_at): DoctorTuple,
) -> DoctorRow {
    DoctorRow {
        doctor_id,
        full_name,
        specialization,
        phone,
        email,
        created_at,
    }
}

/// Lists all doctors, alphabetically by name.
#[instrument(skip(pool))]
pub async fn list_doctors(pool: &MySqlPool) -> Result<Vec<DoctorRow>> {
    let rows: Vec<DoctorTuple> = sqlx_core::query_as::query_as(
        r#"SELECT doctor_id, full_name, specialization, phone, email, created_at
           FROM doctors
           ORDER BY full_name"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(doctor_from_tuple).collect())
}

/// Registers a doctor and logs the mutation in one transaction. Returns
/// the stored row.
#[instrument(skip(pool, doctor), fields(full_name = %doctor.full_name))]
pub async fn create_doctor(pool: &MySqlPool, doctor: &NewDoctor) -> Result<DoctorRow> {
    let mut tx = pool.begin().await?;

    let result = sqlx_core::query::query(
        r#"INSERT INTO doctors (full_name, specialization, phone, email)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(&doctor.full_name)
    .bind(&doctor.specialization)
    .bind(&doctor.phone)
    .bind(&doctor.email)
    .execute(&mut *tx)
    .await?;

    let doctor_id = result.last_insert_id() as i64;

    activity::record(
        &mut tx,
        "CREATE_DOCTOR",
        "DOCTOR",
        Some(doctor_id),
        "New doctor created",
    )
    .await?;

    let row: DoctorTuple = sqlx_core::query_as::query_as(
        r#"SELECT doctor_id, full_name, specialization, phone, email, created_at
           FROM doctors
           WHERE doctor_id = ?"#,
    )
    .bind(doctor_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(doctor_from_tuple(row))
}
