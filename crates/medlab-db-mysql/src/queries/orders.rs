//! The order lifecycle engine: creation, partial updates and result
//! reconciliation.
//!
//! Every mutation runs in one transaction covering the order rows and the
//! activity entry, so a failure partway leaves no partial state.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use medlab_core::{
    CatalogRange, GenderBucket, OrderStatus, Priority, ReferenceRange, resolve_for_snapshot,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx_core::row::Row;
use sqlx_mysql::MySqlPool;
use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};
use crate::queries::activity;

/// One row of the order list projection. Priority and status are in the
/// external vocabulary.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummaryRow {
    pub order_id: i64,
    pub patient_name: String,
    pub order_date: NaiveDateTime,
    pub priority: String,
    pub status: String,
    pub tests_count: i64,
}

/// Full order detail with patient, doctor and line data.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order_id: i64,
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub order_date: NaiveDateTime,
    pub priority: String,
    pub status: String,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub patient_name: String,
    pub patient_dob: Option<NaiveDate>,
    pub patient_gender: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_specialization: Option<String>,
    pub tests: Vec<OrderLineRow>,
}

/// One ordered test line with its snapshot and any recorded result.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineRow {
    pub test_id: i64,
    pub test_name: String,
    pub unit: Option<String>,
    pub normal_range_text: Option<String>,
    pub result_value: Option<Decimal>,
    pub price: Decimal,
}

/// Fields accepted when creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub priority: Priority,
    pub notes: Option<String>,
    pub test_ids: Vec<i64>,
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub priority: Option<Priority>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

impl OrderChanges {
    /// True when no field is supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.status.is_none() && self.notes.is_none()
    }
}

/// One submitted result keyed by test id.
#[derive(Debug, Clone)]
pub struct ResultItem {
    pub test_id: i64,
    pub value: Option<Decimal>,
}

fn validate_test_ids(test_ids: &[i64]) -> Result<()> {
    if test_ids.is_empty() {
        return Err(StoreError::invalid("At least one test is required"));
    }

    let mut seen = HashSet::with_capacity(test_ids.len());
    for &id in test_ids {
        if !seen.insert(id) {
            return Err(StoreError::invalid(format!(
                "Duplicate test id {id} in order"
            )));
        }
    }

    Ok(())
}

/// Lists all orders, newest first.
#[instrument(skip(pool))]
pub async fn list_orders(pool: &MySqlPool) -> Result<Vec<OrderSummaryRow>> {
    let rows: Vec<(i64, String, NaiveDateTime, String, String, i64)> =
        sqlx_core::query_as::query_as(
            r#"SELECT o.order_id, p.full_name, o.order_date, o.priority, o.status,
                      (SELECT COUNT(*) FROM test_order_tests t WHERE t.order_id = o.order_id)
               FROM test_orders o
               JOIN patients p ON p.patient_id = o.patient_id
               ORDER BY o.order_date DESC, o.order_id DESC"#,
        )
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(
            |(order_id, patient_name, order_date, priority, status, tests_count)| {
                Ok(OrderSummaryRow {
                    order_id,
                    patient_name,
                    order_date,
                    priority: Priority::from_db(&priority)?.as_external().to_string(),
                    status: OrderStatus::from_db(&status)?.as_external().to_string(),
                    tests_count,
                })
            },
        )
        .collect()
}

/// Fetches one order with patient, doctor and line details.
#[instrument(skip(pool))]
pub async fn get_order(pool: &MySqlPool, order_id: i64) -> Result<OrderDetail> {
    let row = sqlx_core::query::query(
        r#"SELECT o.order_id, o.patient_id, o.doctor_id, o.order_date, o.priority, o.status,
                  o.total_amount, o.notes,
                  p.full_name AS patient_name,
                  p.date_of_birth AS patient_dob,
                  p.gender AS patient_gender,
                  d.full_name AS doctor_name,
                  d.specialization AS doctor_specialization
           FROM test_orders o
           JOIN patients p ON p.patient_id = o.patient_id
           LEFT JOIN doctors d ON d.doctor_id = o.doctor_id
           WHERE o.order_id = ?"#,
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("Order not found"))?;

    let lines: Vec<(i64, String, Option<String>, Option<String>, Option<Decimal>, Decimal)> =
        sqlx_core::query_as::query_as(
            r#"SELECT tot.test_id, t.test_name, tot.unit, tot.normal_range_text,
                      tot.result_value, t.price
               FROM test_order_tests tot
               JOIN tests t ON t.test_id = tot.test_id
               WHERE tot.order_id = ?
               ORDER BY tot.id"#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

    let priority: String = row.try_get("priority")?;
    let status: String = row.try_get("status")?;

    Ok(OrderDetail {
        order_id: row.try_get("order_id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        order_date: row.try_get("order_date")?,
        priority: Priority::from_db(&priority)?.as_external().to_string(),
        status: OrderStatus::from_db(&status)?.as_external().to_string(),
        total_amount: row.try_get("total_amount")?,
        notes: row.try_get("notes")?,
        patient_name: row.try_get("patient_name")?,
        patient_dob: row.try_get("patient_dob")?,
        patient_gender: row.try_get("patient_gender")?,
        doctor_name: row.try_get("doctor_name")?,
        doctor_specialization: row.try_get("doctor_specialization")?,
        tests: lines
            .into_iter()
            .map(
                |(test_id, test_name, unit, normal_range_text, result_value, price)| OrderLineRow {
                    test_id,
                    test_name,
                    unit,
                    normal_range_text,
                    result_value,
                    price,
                },
            )
            .collect(),
    })
}

/// Creates an order: validates the test list, prices it once at creation,
/// snapshots unit and range text per line, and logs the mutation. Returns
/// the new order id.
#[instrument(skip(pool, order), fields(patient_id = order.patient_id, tests = order.test_ids.len()))]
pub async fn create_order(pool: &MySqlPool, order: &NewOrder) -> Result<i64> {
    validate_test_ids(&order.test_ids)?;

    let mut tx = pool.begin().await?;

    // Price and snapshot every test before writing anything. A missing or
    // inactive id rejects the whole order.
    let mut total = Decimal::ZERO;
    let mut snapshots = Vec::with_capacity(order.test_ids.len());
    for &test_id in &order.test_ids {
        let test: Option<(Option<String>, Option<Decimal>, Option<Decimal>, Decimal)> =
            sqlx_core::query_as::query_as(
                r#"SELECT unit, normal_min, normal_max, price
                   FROM tests
                   WHERE test_id = ? AND is_active = 1"#,
            )
            .bind(test_id)
            .fetch_optional(&mut *tx)
            .await?;

        let (unit, normal_min, normal_max, price) = test.ok_or_else(|| {
            StoreError::invalid(format!("Test {test_id} does not reference an active test"))
        })?;

        total += price;

        let range_rows: Vec<(String, Option<Decimal>, Option<Decimal>, Option<String>)> =
            sqlx_core::query_as::query_as(
                r#"SELECT gender, normal_min, normal_max, unit
                   FROM test_reference_ranges
                   WHERE test_id = ?
                   ORDER BY range_id"#,
            )
            .bind(test_id)
            .fetch_all(&mut *tx)
            .await?;

        let mut ranges = Vec::with_capacity(range_rows.len());
        for (gender, min, max, range_unit) in range_rows {
            ranges.push(ReferenceRange {
                bucket: GenderBucket::from_db(&gender)?,
                min,
                max,
                unit: range_unit,
            });
        }

        // Snapshots are gender-agnostic: resolve against the ANY bucket,
        // falling back to the catalog-level range.
        let catalog = CatalogRange {
            min: normal_min,
            max: normal_max,
            unit: unit.clone(),
        };
        let range_text =
            resolve_for_snapshot(&ranges, GenderBucket::Any, &catalog).map(|r| r.display_text());

        snapshots.push((test_id, unit, range_text));
    }

    let result = sqlx_core::query::query(
        r#"INSERT INTO test_orders (patient_id, doctor_id, priority, status, total_amount, notes)
           VALUES (?, ?, ?, 'PENDING', ?, ?)"#,
    )
    .bind(order.patient_id)
    .bind(order.doctor_id)
    .bind(order.priority.as_db())
    .bind(total)
    .bind(&order.notes)
    .execute(&mut *tx)
    .await?;

    let order_id = result.last_insert_id() as i64;

    for (test_id, unit, range_text) in snapshots {
        sqlx_core::query::query(
            r#"INSERT INTO test_order_tests (order_id, test_id, unit, normal_range_text)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(order_id)
        .bind(test_id)
        .bind(unit)
        .bind(range_text)
        .execute(&mut *tx)
        .await?;
    }

    activity::record(&mut tx, "CREATE_ORDER", "ORDER", Some(order_id), "Order created").await?;

    tx.commit().await?;

    info!(order_id, "Order created");

    Ok(order_id)
}

fn update_clauses(changes: &OrderChanges) -> Vec<&'static str> {
    let mut clauses = Vec::new();
    if changes.priority.is_some() {
        clauses.push("priority = ?");
    }
    if changes.status.is_some() {
        clauses.push("status = ?");
    }
    if changes.notes.is_some() {
        clauses.push("notes = ?");
    }
    clauses
}

/// Applies a partial update to an order. A missing order is detected at
/// update time by zero matched rows rather than a pre-check.
#[instrument(skip(pool, changes))]
pub async fn update_order(pool: &MySqlPool, order_id: i64, changes: &OrderChanges) -> Result<()> {
    let clauses = update_clauses(changes);
    if clauses.is_empty() {
        return Err(StoreError::invalid("Nothing to update"));
    }

    let mut tx = pool.begin().await?;

    let sql = format!(
        "UPDATE test_orders SET {} WHERE order_id = ?",
        clauses.join(", ")
    );
    let mut query = sqlx_core::query::query(&sql);
    if let Some(priority) = changes.priority {
        query = query.bind(priority.as_db());
    }
    if let Some(status) = changes.status {
        query = query.bind(status.as_db());
    }
    if let Some(notes) = &changes.notes {
        query = query.bind(notes);
    }

    let result = query.bind(order_id).execute(&mut *tx).await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("Order not found"));
    }

    activity::record(&mut tx, "UPDATE_ORDER", "ORDER", Some(order_id), "Order updated").await?;

    tx.commit().await?;

    Ok(())
}

/// Reconciles submitted results against the order's lines. Items whose
/// test id is not on the order are skipped silently. When `mark_completed`
/// the order moves to `REPORT_READY` whether or not every line received a
/// value.
#[instrument(skip(pool, results), fields(results = results.len()))]
pub async fn submit_results(
    pool: &MySqlPool,
    order_id: i64,
    results: &[ResultItem],
    mark_completed: bool,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let exists: Option<(i64,)> =
        sqlx_core::query_as::query_as("SELECT order_id FROM test_orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(StoreError::not_found("Order not found"));
    }

    let mut matched = 0u32;
    for item in results {
        let line: Option<(i64,)> = sqlx_core::query_as::query_as(
            "SELECT id FROM test_order_tests WHERE order_id = ? AND test_id = ?",
        )
        .bind(order_id)
        .bind(item.test_id)
        .fetch_optional(&mut *tx)
        .await?;

        if line.is_none() {
            debug!(test_id = item.test_id, "Result for a test not on the order, skipped");
            continue;
        }

        sqlx_core::query::query(
            r#"UPDATE test_order_tests
               SET result_value = ?, result_entered_at = NOW()
               WHERE order_id = ? AND test_id = ?"#,
        )
        .bind(item.value)
        .bind(order_id)
        .bind(item.test_id)
        .execute(&mut *tx)
        .await?;

        matched += 1;
    }

    if mark_completed {
        sqlx_core::query::query("UPDATE test_orders SET status = 'REPORT_READY' WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
    }

    activity::record(
        &mut tx,
        "UPDATE_RESULTS",
        "ORDER",
        Some(order_id),
        "Test results updated",
    )
    .await?;

    tx.commit().await?;

    info!(order_id, matched, "Results updated");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_list() {
        let err = validate_test_ids(&[]).unwrap_err();
        assert_eq!(err.to_string(), "At least one test is required");
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let err = validate_test_ids(&[3, 7, 3]).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(err.to_string(), "Duplicate test id 3 in order");
    }

    #[test]
    fn test_validate_accepts_distinct_ids() {
        assert!(validate_test_ids(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn test_update_clauses_follow_field_order() {
        let changes = OrderChanges {
            priority: Some(Priority::Urgent),
            status: Some(OrderStatus::ReportReady),
            notes: Some("checked".to_string()),
        };
        assert_eq!(
            update_clauses(&changes),
            vec!["priority = ?", "status = ?", "notes = ?"]
        );
    }

    #[test]
    fn test_update_clauses_partial() {
        let changes = OrderChanges {
            notes: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(update_clauses(&changes), vec!["notes = ?"]);
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_empty_changes_have_no_clauses() {
        let changes = OrderChanges::default();
        assert!(changes.is_empty());
        assert!(update_clauses(&changes).is_empty());
    }
}
