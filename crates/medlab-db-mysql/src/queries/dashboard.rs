//! Dashboard aggregates.

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use sqlx_mysql::MySqlPool;
use tracing::instrument;

use crate::error::Result;

/// Headline counters for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub orders_today: i64,
    pub orders_yesterday: i64,
    pub pending_reports: i64,
    pub urgent_pending_reports: i64,
    pub completed_reports: i64,
    pub completed_yesterday: i64,
    pub total_patients: i64,
    pub new_patients_this_week: i64,
}

/// One point of the daily order-count series.
#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// The full dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPayload {
    pub stats: DashboardStats,
    #[serde(rename = "ordersLast7Days")]
    pub orders_last7_days: Vec<DayCount>,
}

/// Densifies the sparse per-day counts into exactly seven points, oldest
/// first and inclusive of `today`. Days without orders count zero.
fn fill_last7(today: NaiveDate, rows: &[(NaiveDate, i64)]) -> Vec<DayCount> {
    let by_date: HashMap<NaiveDate, i64> = rows.iter().copied().collect();
    (0..7)
        .map(|back| {
            let date = today - Duration::days(6 - back);
            DayCount {
                date,
                count: by_date.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

async fn count_orders_on(pool: &MySqlPool, day: NaiveDate) -> Result<i64> {
    let count = sqlx_core::query_scalar::query_scalar(
        "SELECT COUNT(*) FROM test_orders WHERE DATE(order_date) = ?",
    )
    .bind(day)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

async fn count_completed_on(pool: &MySqlPool, day: NaiveDate) -> Result<i64> {
    let count = sqlx_core::query_scalar::query_scalar(
        "SELECT COUNT(*) FROM test_orders WHERE status = 'REPORT_READY' AND DATE(order_date) = ?",
    )
    .bind(day)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Assembles the dashboard: today/yesterday counters, backlog counts,
/// patient totals and the trailing-week series. Calendar days follow the
/// server's local timezone.
#[instrument(skip(pool))]
pub async fn dashboard(pool: &MySqlPool) -> Result<DashboardPayload> {
    let today = Local::now().date_naive();
    let yesterday = today - Duration::days(1);
    let week_start = today - Duration::days(6);

    let orders_today = count_orders_on(pool, today).await?;
    let orders_yesterday = count_orders_on(pool, yesterday).await?;

    let pending_reports: i64 = sqlx_core::query_scalar::query_scalar(
        "SELECT COUNT(*) FROM test_orders WHERE status = 'PENDING'",
    )
    .fetch_one(pool)
    .await?;

    let urgent_pending_reports: i64 = sqlx_core::query_scalar::query_scalar(
        "SELECT COUNT(*) FROM test_orders WHERE status = 'PENDING' AND priority = 'URGENT'",
    )
    .fetch_one(pool)
    .await?;

    let completed_reports = count_completed_on(pool, today).await?;
    let completed_yesterday = count_completed_on(pool, yesterday).await?;

    let total_patients: i64 =
        sqlx_core::query_scalar::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(pool)
            .await?;

    let new_patients_this_week: i64 = sqlx_core::query_scalar::query_scalar(
        "SELECT COUNT(*) FROM patients WHERE DATE(created_at) >= ?",
    )
    .bind(week_start)
    .fetch_one(pool)
    .await?;

    let series: Vec<(NaiveDate, i64)> = sqlx_core::query_as::query_as(
        r#"SELECT DATE(order_date), COUNT(*)
           FROM test_orders
           WHERE DATE(order_date) >= ?
           GROUP BY DATE(order_date)
           ORDER BY DATE(order_date)"#,
    )
    .bind(week_start)
    .fetch_all(pool)
    .await?;

    Ok(DashboardPayload {
        stats: DashboardStats {
            orders_today,
            orders_yesterday,
            pending_reports,
            urgent_pending_reports,
            completed_reports,
            completed_yesterday,
            total_patients,
            new_patients_this_week,
        },
        orders_last7_days: fill_last7(today, &series),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_fill_last7_densifies_sparse_counts() {
        let today = day("2026-08-25");
        let rows = vec![(day("2026-08-25"), 4), (day("2026-08-21"), 2)];

        let series = fill_last7(today, &rows);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, day("2026-08-19"));
        assert_eq!(series[0].count, 0);
        assert_eq!(series[2].date, day("2026-08-21"));
        assert_eq!(series[2].count, 2);
        assert_eq!(series[6].date, day("2026-08-25"));
        assert_eq!(series[6].count, 4);
    }

    #[test]
    fn test_fill_last7_all_zero_without_orders() {
        let series = fill_last7(day("2026-08-25"), &[]);
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|p| p.count == 0));
    }

    #[test]
    fn test_fill_last7_is_oldest_first_and_contiguous() {
        let series = fill_last7(day("2026-03-03"), &[]);
        assert_eq!(series[0].date, day("2026-02-25"));
        for window in series.windows(2) {
            assert_eq!(window[1].date - window[0].date, Duration::days(1));
        }
    }
}
