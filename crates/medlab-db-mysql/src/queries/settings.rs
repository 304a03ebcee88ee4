//! Flat key/value settings with insert-or-replace semantics.

use std::collections::BTreeMap;

use sqlx_mysql::MySqlPool;
use tracing::instrument;

use crate::error::Result;
use crate::queries::activity;

/// Reads every setting. Keys with a NULL value render as the empty string.
#[instrument(skip(pool))]
pub async fn get_settings(pool: &MySqlPool) -> Result<BTreeMap<String, String>> {
    let rows: Vec<(String, Option<String>)> =
        sqlx_core::query_as::query_as("SELECT setting_key, setting_value FROM app_settings")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Upserts every supplied pair and logs once. Writing an existing key keeps
/// a single row holding the latest value.
#[instrument(skip(pool, settings), fields(keys = settings.len()))]
pub async fn upsert_settings(pool: &MySqlPool, settings: &BTreeMap<String, String>) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (key, value) in settings {
        sqlx_core::query::query(
            r#"INSERT INTO app_settings (setting_key, setting_value)
               VALUES (?, ?)
               ON DUPLICATE KEY UPDATE setting_value = VALUES(setting_value)"#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    activity::record(&mut tx, "UPDATE_SETTINGS", "SETTINGS", None, "Settings updated").await?;

    tx.commit().await?;

    Ok(())
}
