//! Schema management for the MySQL storage backend.
//!
//! The schema is fixed: nine tables created in dependency order plus a
//! lookup index on reference ranges. Creation is idempotent and safe to run
//! on every process start, including concurrently.

use std::sync::Arc;

use dashmap::DashSet;
use sqlx_mysql::MySqlPool;
use tracing::{debug, info, instrument};

use crate::error::{Result, is_duplicate_index};

/// Ordered table definitions. Referenced tables always precede the tables
/// that carry foreign keys to them.
const TABLES: [(&str, &str); 9] = [
    (
        "test_categories",
        r#"CREATE TABLE IF NOT EXISTS test_categories (
            category_id INT AUTO_INCREMENT PRIMARY KEY,
            category_name VARCHAR(255) NOT NULL,
            description VARCHAR(255) NULL
        )"#,
    ),
    (
        "tests",
        r#"CREATE TABLE IF NOT EXISTS tests (
            test_id INT AUTO_INCREMENT PRIMARY KEY,
            test_name VARCHAR(255) NOT NULL,
            category_id INT NULL,
            sample_type VARCHAR(64) NULL,
            unit VARCHAR(32) NULL,
            normal_min DECIMAL(10,2) NULL,
            normal_max DECIMAL(10,2) NULL,
            price DECIMAL(10,2) NOT NULL DEFAULT 0,
            is_active TINYINT(1) NOT NULL DEFAULT 1,
            FOREIGN KEY (category_id) REFERENCES test_categories(category_id) ON DELETE SET NULL
        )"#,
    ),
    (
        "test_reference_ranges",
        r#"CREATE TABLE IF NOT EXISTS test_reference_ranges (
            range_id INT AUTO_INCREMENT PRIMARY KEY,
            test_id INT NOT NULL,
            gender ENUM('M','F','ANY') NOT NULL DEFAULT 'ANY',
            age_min INT NULL,
            age_max INT NULL,
            normal_min DECIMAL(10,2) NULL,
            normal_max DECIMAL(10,2) NULL,
            unit VARCHAR(32) NULL,
            notes VARCHAR(255) NULL,
            FOREIGN KEY (test_id) REFERENCES tests(test_id) ON DELETE CASCADE
        )"#,
    ),
    (
        "patients",
        r#"CREATE TABLE IF NOT EXISTS patients (
            patient_id INT AUTO_INCREMENT PRIMARY KEY,
            full_name VARCHAR(255) NOT NULL,
            date_of_birth DATE NULL,
            gender ENUM('M','F','O') NULL,
            phone VARCHAR(32) NULL,
            email VARCHAR(255) NULL,
            address VARCHAR(255) NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
    (
        "doctors",
        r#"CREATE TABLE IF NOT EXISTS doctors (
            doctor_id INT AUTO_INCREMENT PRIMARY KEY,
            full_name VARCHAR(255) NOT NULL,
            specialization VARCHAR(255) NULL,
            phone VARCHAR(32) NULL,
            email VARCHAR(255) NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
    (
        "test_orders",
        r#"CREATE TABLE IF NOT EXISTS test_orders (
            order_id INT AUTO_INCREMENT PRIMARY KEY,
            patient_id INT NOT NULL,
            doctor_id INT NULL,
            order_date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            priority ENUM('NORMAL','URGENT') NOT NULL DEFAULT 'NORMAL',
            status ENUM('PENDING','SAMPLE_COLLECTED','RESULTS_ENTERED','REPORT_READY')
                NOT NULL DEFAULT 'PENDING',
            total_amount DECIMAL(10,2) NOT NULL DEFAULT 0,
            notes TEXT NULL,
            FOREIGN KEY (patient_id) REFERENCES patients(patient_id),
            FOREIGN KEY (doctor_id) REFERENCES doctors(doctor_id) ON DELETE SET NULL
        )"#,
    ),
    (
        "test_order_tests",
        r#"CREATE TABLE IF NOT EXISTS test_order_tests (
            id INT AUTO_INCREMENT PRIMARY KEY,
            order_id INT NOT NULL,
            test_id INT NOT NULL,
            unit VARCHAR(32) NULL,
            normal_range_text VARCHAR(255) NULL,
            result_value DECIMAL(10,2) NULL,
            result_flag ENUM('LOW','NORMAL','HIGH') NULL,
            result_entered_at DATETIME NULL,
            FOREIGN KEY (order_id) REFERENCES test_orders(order_id) ON DELETE CASCADE,
            FOREIGN KEY (test_id) REFERENCES tests(test_id)
        )"#,
    ),
    (
        "app_settings",
        r#"CREATE TABLE IF NOT EXISTS app_settings (
            setting_key VARCHAR(255) PRIMARY KEY,
            setting_value TEXT NULL
        )"#,
    ),
    (
        "activity_log",
        r#"CREATE TABLE IF NOT EXISTS activity_log (
            log_id INT AUTO_INCREMENT PRIMARY KEY,
            action VARCHAR(64) NOT NULL,
            entity_type VARCHAR(32) NOT NULL,
            entity_id INT NULL,
            description TEXT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
    ),
];

const RANGE_INDEX: &str = "idx_trr";

/// Manages schema creation with a table existence cache.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: MySqlPool,
    created: Arc<DashSet<String>>,
}

impl SchemaManager {
    /// Creates a new schema manager.
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            created: Arc::new(DashSet::new()),
        }
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Ensures every table and index exists.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<()> {
        for (table, ddl) in TABLES {
            self.ensure_table(table, ddl).await?;
        }
        self.ensure_range_index().await?;
        Ok(())
    }

    async fn ensure_table(&self, table: &str, ddl: &str) -> Result<()> {
        if self.created.contains(table) {
            debug!("Table {} found in cache", table);
            return Ok(());
        }

        if self.table_exists(table).await? {
            debug!("Table {} exists in database, adding to cache", table);
            self.created.insert(table.to_string());
            return Ok(());
        }

        info!("Creating table: {}", table);
        sqlx_core::query::query(ddl).execute(&self.pool).await?;
        self.created.insert(table.to_string());

        Ok(())
    }

    /// Checks whether a table exists in the current database.
    async fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = sqlx_core::query_scalar::query_scalar(
            r#"SELECT COUNT(*) FROM information_schema.tables
               WHERE table_schema = DATABASE() AND table_name = ?"#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Creates the reference-range lookup index. MySQL has no
    /// `CREATE INDEX IF NOT EXISTS`, so the duplicate-key-name error from a
    /// repeated or concurrent call is swallowed.
    async fn ensure_range_index(&self) -> Result<()> {
        if self.created.contains(RANGE_INDEX) {
            return Ok(());
        }

        let result = sqlx_core::query::query(
            "CREATE INDEX idx_trr ON test_reference_ranges (test_id, gender, age_min, age_max)",
        )
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Created index {}", RANGE_INDEX);
            }
            Err(e) if is_duplicate_index(&e) => {
                debug!("Index {} already exists", RANGE_INDEX);
            }
            Err(e) => return Err(e.into()),
        }

        self.created.insert(RANGE_INDEX.to_string());
        Ok(())
    }

    /// Clears the existence cache, forcing re-checks against the database.
    pub fn clear_cache(&self) {
        self.created.clear();
    }

    /// Number of cached table names.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.created.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(table: &str) -> usize {
        TABLES
            .iter()
            .position(|(name, _)| *name == table)
            .unwrap_or_else(|| panic!("table {table} not defined"))
    }

    #[test]
    fn test_all_tables_defined() {
        assert_eq!(TABLES.len(), 9);
        for table in [
            "test_categories",
            "tests",
            "test_reference_ranges",
            "patients",
            "doctors",
            "test_orders",
            "test_order_tests",
            "app_settings",
            "activity_log",
        ] {
            assert!(TABLES.iter().any(|(name, _)| *name == table), "{table}");
        }
    }

    #[test]
    fn test_referenced_tables_come_first() {
        assert!(position("test_categories") < position("tests"));
        assert!(position("tests") < position("test_reference_ranges"));
        assert!(position("patients") < position("test_orders"));
        assert!(position("doctors") < position("test_orders"));
        assert!(position("test_orders") < position("test_order_tests"));
        assert!(position("tests") < position("test_order_tests"));
    }

    #[test]
    fn test_ddl_is_idempotent() {
        for (table, ddl) in TABLES {
            assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS"), "{table}");
            assert!(ddl.contains(table), "{table}");
        }
    }

    #[test]
    fn test_enum_vocabularies() {
        let orders = TABLES[position("test_orders")].1;
        assert!(orders.contains("ENUM('NORMAL','URGENT')"));
        assert!(orders.contains("ENUM('PENDING','SAMPLE_COLLECTED','RESULTS_ENTERED','REPORT_READY')"));

        let ranges = TABLES[position("test_reference_ranges")].1;
        assert!(ranges.contains("ENUM('M','F','ANY')"));

        let lines = TABLES[position("test_order_tests")].1;
        assert!(lines.contains("ENUM('LOW','NORMAL','HIGH')"));

        let patients = TABLES[position("patients")].1;
        assert!(patients.contains("ENUM('M','F','O')"));
    }
}
