//! Append-only activity log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx_core::transaction::Transaction;
use sqlx_mysql::{MySql, MySqlPool};
use tracing::instrument;

use crate::error::Result;

/// A single audit entry.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRow {
    pub log_id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends one audit entry inside the caller's transaction. The entry
/// commits or rolls back together with the mutation it documents.
pub async fn record(
    tx: &mut Transaction<'_, MySql>,
    action: &str,
    entity_type: &str,
    entity_id: Option<i64>,
    description: &str,
) -> Result<()> {
    sqlx_core::query::query(
        r#"INSERT INTO activity_log (action, entity_type, entity_id, description)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(description)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Lists audit entries, newest first. The log id breaks ties between
/// entries written in the same second.
#[instrument(skip(pool))]
pub async fn list_activity(pool: &MySqlPool, limit: i64) -> Result<Vec<ActivityRow>> {
    let rows: Vec<(i64, String, String, Option<i64>, Option<String>, DateTime<Utc>)> =
        sqlx_core::query_as::query_as(
            r#"SELECT log_id, action, entity_type, entity_id, description, created_at
               FROM activity_log
               ORDER BY created_at DESC, log_id DESC
               LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(log_id, action, entity_type, entity_id, description, created_at)| ActivityRow {
                log_id,
                action,
                entity_type,
                entity_id,
                description,
                created_at,
            },
        )
        .collect())
}
