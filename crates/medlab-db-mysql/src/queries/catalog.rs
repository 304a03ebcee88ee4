//! Test catalog listing.

use std::collections::HashMap;

use medlab_core::{GenderBucket, ReferenceRange, bucket_display_text};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx_core::row::Row;
use sqlx_mysql::MySqlPool;
use tracing::instrument;

use crate::error::Result;

/// An active catalog test with its category and per-bucket range texts.
///
/// The three range texts are computed independently per gender bucket and
/// stay absent when no usable row of that bucket exists. Unlike the
/// order-creation snapshot there is no fallback to the catalog-level range
/// here.
#[derive(Debug, Clone, Serialize)]
pub struct TestListingRow {
    pub test_id: i64,
    pub test_name: String,
    pub sample_type: Option<String>,
    pub unit: Option<String>,
    pub price: Decimal,
    pub category_name: Option<String>,
    pub any_range_text: Option<String>,
    pub male_range_text: Option<String>,
    pub female_range_text: Option<String>,
}

/// Lists active tests with category names, alphabetically by test name.
#[instrument(skip(pool))]
pub async fn list_active_tests(pool: &MySqlPool) -> Result<Vec<TestListingRow>> {
    let tests = sqlx_core::query::query(
        r#"SELECT t.test_id, t.test_name, t.sample_type, t.unit, t.price, c.category_name
           FROM tests t
           LEFT JOIN test_categories c ON c.category_id = t.category_id
           WHERE t.is_active = 1
           ORDER BY t.test_name"#,
    )
    .fetch_all(pool)
    .await?;

    // One pass over all ranges of active tests, grouped in memory. Range id
    // order reproduces insertion order, so the last row of a bucket wins.
    let range_rows: Vec<(i64, String, Option<Decimal>, Option<Decimal>, Option<String>)> =
        sqlx_core::query_as::query_as(
            r#"SELECT r.test_id, r.gender, r.normal_min, r.normal_max, r.unit
               FROM test_reference_ranges r
               JOIN tests t ON t.test_id = r.test_id
               WHERE t.is_active = 1
               ORDER BY r.range_id"#,
        )
        .fetch_all(pool)
        .await?;

    let mut ranges_by_test: HashMap<i64, Vec<ReferenceRange>> = HashMap::new();
    for (test_id, gender, min, max, unit) in range_rows {
        let bucket = GenderBucket::from_db(&gender)?;
        ranges_by_test.entry(test_id).or_default().push(ReferenceRange {
            bucket,
            min,
            max,
            unit,
        });
    }

    let mut listing = Vec::with_capacity(tests.len());
    for row in &tests {
        let test_id: i64 = row.try_get("test_id")?;
        let unit: Option<String> = row.try_get("unit")?;
        let ranges = ranges_by_test.remove(&test_id).unwrap_or_default();

        listing.push(TestListingRow {
            test_id,
            test_name: row.try_get("test_name")?,
            sample_type: row.try_get("sample_type")?,
            price: row.try_get("price")?,
            category_name: row.try_get("category_name")?,
            any_range_text: bucket_display_text(&ranges, GenderBucket::Any, unit.as_deref()),
            male_range_text: bucket_display_text(&ranges, GenderBucket::Male, unit.as_deref()),
            female_range_text: bucket_display_text(&ranges, GenderBucket::Female, unit.as_deref()),
            unit,
        });
    }

    Ok(listing)
}
