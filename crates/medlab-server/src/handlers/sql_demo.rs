//! Read-only SQL demo console.
//!
//! An explicit escape hatch for demonstrations: callers submit one SELECT
//! statement and get raw rows back. Queries run over a dedicated pool when
//! `sql_demo.url` is configured, so the endpoint can be pointed at a
//! restricted read-only account instead of the main one.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveDateTime};
use medlab_api::ApiError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx_core::column::Column;
use sqlx_core::row::Row;
use sqlx_mysql::MySqlRow;
use tracing::{debug, info, warn};

use crate::server::AppState;

/// First keyword must not be a write statement, and the query as a whole
/// must read as a SELECT.
const FORBIDDEN: [&str; 7] = [
    "insert", "update", "delete", "drop", "alter", "create", "truncate",
];

/// Request body for the demo console.
#[derive(Debug, Deserialize)]
pub struct SqlDemoRequest {
    #[serde(default)]
    pub query: String,
}

/// Response from the demo console.
#[derive(Debug, Serialize)]
pub struct SqlDemoResponse {
    /// Column names in order
    pub columns: Vec<String>,
    /// Row data as array of arrays (each inner array is a row)
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    /// Execution time in milliseconds
    #[serde(rename = "timeMs")]
    pub time_ms: f64,
}

fn screen_query(query: &str) -> Result<(), &'static str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err("Query empty.");
    }
    let lowered = trimmed.to_lowercase();
    let first = lowered.split_whitespace().next().unwrap_or("");
    if FORBIDDEN.contains(&first) || !lowered.starts_with("select") {
        return Err("Only safe SELECT queries allowed.");
    }
    Ok(())
}

/// Handler for POST /api/sql-demo
pub async fn sql_demo(
    State(state): State<AppState>,
    Json(req): Json<SqlDemoRequest>,
) -> Result<Response, ApiError> {
    let Some(pool) = state.sql_pool.as_ref() else {
        return Err(ApiError::forbidden("SQL demo is disabled"));
    };

    if let Err(msg) = screen_query(&req.query) {
        warn!(query = %req.query, "Query rejected by demo screening");
        return Err(ApiError::bad_request(msg));
    }

    info!(
        query_preview = %req.query.chars().take(100).collect::<String>(),
        "Executing demo query"
    );

    // Execute query with timing
    let start = Instant::now();
    let rows = sqlx_core::query::query(&req.query)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Demo query execution failed");
            ApiError::bad_request(format!("Query execution failed: {}", e))
        })?;
    let time_ms = start.elapsed().as_secs_f64() * 1000.0;

    // Extract column names from first row (if any)
    let columns: Vec<String> = if let Some(first_row) = rows.first() {
        first_row
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    } else {
        Vec::new()
    };

    let mut result_rows: Vec<Vec<Value>> = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut row_data: Vec<Value> = Vec::with_capacity(columns.len());
        for idx in 0..row.columns().len() {
            row_data.push(decode_column(row, idx));
        }
        result_rows.push(row_data);
    }

    let row_count = result_rows.len();

    info!(row_count, "Demo query executed");

    let response = SqlDemoResponse {
        columns,
        rows: result_rows,
        row_count,
        time_ms,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Decodes one column into JSON by trying types in order. NULL fails every
/// decode and falls through to `null`; datetimes render ISO-8601.
fn decode_column(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(val) = row.try_get::<String, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<i64, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<f64, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<Decimal, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<NaiveDateTime, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<NaiveDate, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<bool, _>(idx) {
        json!(val)
    } else if let Ok(val) = row.try_get::<Value, _>(idx) {
        val
    } else {
        let col_type = row.columns()[idx].type_info();
        debug!(column_type = ?col_type, idx, "Unmapped column type, returning null");
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_selects() {
        assert!(screen_query("SELECT * FROM patients LIMIT 5").is_ok());
        assert!(screen_query("  select count(*) from tests  ").is_ok());
    }

    #[test]
    fn rejects_empty_queries() {
        assert_eq!(screen_query(""), Err("Query empty."));
        assert_eq!(screen_query("   "), Err("Query empty."));
    }

    #[test]
    fn rejects_write_statements() {
        for q in [
            "INSERT INTO patients VALUES (1)",
            "update tests set price = 0",
            "DELETE FROM test_orders",
            "DROP TABLE app_settings",
            "alter table doctors add column x int",
            "CREATE TABLE t (id INT)",
            "truncate activity_log",
        ] {
            assert_eq!(screen_query(q), Err("Only safe SELECT queries allowed."));
        }
    }

    #[test]
    fn rejects_non_select_prefixes() {
        assert_eq!(
            screen_query("SHOW TABLES"),
            Err("Only safe SELECT queries allowed.")
        );
        assert_eq!(
            screen_query("WITH x AS (SELECT 1) SELECT * FROM x"),
            Err("Only safe SELECT queries allowed.")
        );
    }

    #[test]
    fn response_serializes_with_camel_case_keys() {
        let resp = SqlDemoResponse {
            columns: vec!["patient_id".into()],
            rows: vec![vec![json!(1)]],
            row_count: 1,
            time_ms: 1.25,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["rowCount"], 1);
        assert_eq!(value["timeMs"], 1.25);
        assert_eq!(value["rows"][0][0], 1);
    }
}
