//! Table creation from the configured schema descriptor.

use filevault_core::error::AppError;
use filevault_database::migration::run_migrations;

use crate::output;

/// Create any missing tables. Existing tables are left untouched.
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, builder) = super::open_database(&config).await?;

    println!("Creating tables...");
    let result = run_migrations(&db, &builder).await;
    db.close().await;
    result?;

    output::print_success("Tables are up to date.");
    Ok(())
}
