//! MySQL storage backend for the MedLAB+ laboratory server.
//!
//! This crate owns everything that touches the database:
//!
//! - **Pool management** - connection pooling over sqlx with bootstrap of
//!   the database itself on first start
//! - **Schema management** - idempotent creation of the nine LIMS tables
//!   in dependency order, with an in-process existence cache
//! - **Queries** - one module per API surface area; mutations are
//!   transactional and carry their own activity-log entry
//!
//! # Example
//!
//! ```rust,no_run
//! use medlab_db_mysql::{DbConfig, SchemaManager, create_pool, ensure_database};
//!
//! # async fn example() -> medlab_db_mysql::Result<()> {
//! let config = DbConfig::new("mysql://root@localhost:3306/medlab_db");
//! ensure_database(&config).await?;
//! let pool = create_pool(&config).await?;
//! SchemaManager::new(pool).ensure_schema().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod pool;
mod schema;

pub mod queries;

pub use config::DbConfig;
pub use error::{Result, StoreError, is_duplicate_index};
pub use pool::{MySqlPoolOptions, create_lazy_pool, create_pool, ensure_database};
pub use schema::SchemaManager;

// Re-exported so callers can hold a pool without a direct sqlx dependency.
pub use sqlx_mysql::MySqlPool;

/// Commonly used types for working with the storage backend.
pub mod prelude {
    pub use crate::config::DbConfig;
    pub use crate::error::{Result, StoreError};
    pub use crate::pool::{create_lazy_pool, create_pool, ensure_database};
    pub use crate::schema::SchemaManager;
}
