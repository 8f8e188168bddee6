//! Database migration command.

use drive_core::config::AppConfig;
use drive_core::result::AppResult;
use drive_database::DatabasePool;
use drive_database::migration::run_migrations;

use crate::output;

/// Run all pending migrations
pub async fn execute(config: &AppConfig) -> AppResult<()> {
    let pool = DatabasePool::connect(&config.database).await?;
    println!("Running database migrations...");
    run_migrations(pool.pool()).await?;
    pool.close().await;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
