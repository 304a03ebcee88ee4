use anyhow::Result;
use medlab_db_mysql::{DbConfig, SchemaManager, create_pool, ensure_database};

use crate::output::print_success;

/// Creates the database and every table the backend expects.
/// Safe to run repeatedly; existing objects are left alone.
pub async fn run(config: &DbConfig) -> Result<()> {
    ensure_database(config).await?;
    print_success(&format!("Database '{}' is present", config.database()?));

    let pool = create_pool(config).await?;
    SchemaManager::new(pool).ensure_schema().await?;
    print_success("Schema is up to date");

    Ok(())
}
