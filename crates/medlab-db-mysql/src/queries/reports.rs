//! Completed-report listing.

use chrono::NaiveDateTime;
use medlab_core::{OrderStatus, Priority};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx_mysql::MySqlPool;
use tracing::instrument;

use crate::error::Result;

/// One finished report. Status is always the external `completed` label.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub order_id: i64,
    pub patient_name: String,
    pub order_date: NaiveDateTime,
    pub priority: String,
    pub status: String,
    pub total_amount: Decimal,
}

/// Lists orders whose report is ready, newest first.
#[instrument(skip(pool))]
pub async fn list_completed(pool: &MySqlPool) -> Result<Vec<ReportRow>> {
    let rows: Vec<(i64, String, NaiveDateTime, String, Decimal)> =
        sqlx_core::query_as::query_as(
            r#"SELECT o.order_id, p.full_name, o.order_date, o.priority, o.total_amount
               FROM test_orders o
               JOIN patients p ON p.patient_id = o.patient_id
               WHERE o.status = 'REPORT_READY'
               ORDER BY o.order_date DESC, o.order_id DESC"#,
        )
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|(order_id, patient_name, order_date, priority, total_amount)| {
            Ok(ReportRow {
                order_id,
                patient_name,
                order_date,
                priority: Priority::from_db(&priority)?.as_external().to_string(),
                status: OrderStatus::ReportReady.as_external().to_string(),
                total_amount,
            })
        })
        .collect()
}
