//! Schema creation from the configured descriptor.

use tracing::info;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;

use crate::builder::QueryBuilder;
use crate::connection::{DatabasePool, commit};

/// Create the schema and the three tables if they do not exist yet.
pub async fn run_migrations(db: &DatabasePool, builder: &QueryBuilder) -> AppResult<()> {
    info!(
        users = %builder.schema().user_table.name,
        categories = %builder.schema().categ_table.name,
        files = %builder.schema().file_table.name,
        "Running database migrations..."
    );

    let mut tx = db.begin().await?;
    for statement in builder.ddl() {
        let rendered = statement.render()?;
        rendered.query().execute(&mut *tx).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;
    }
    commit(tx).await?;

    info!("Database migrations completed successfully");
    Ok(())
}
