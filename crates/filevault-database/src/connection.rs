//! Connection pool management over the `sqlx` any-driver.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyPool};
use tracing::{debug, info};

use filevault_core::config::DatabaseConfig;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;

use crate::builder::QueryBuilder;

/// An open transaction. Dropping it without [`commit`] rolls it back.
pub type Transaction = sqlx::Transaction<'static, Any>;

/// Wrapper around the sqlx connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: AnyPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        sqlx::any::install_default_drivers();

        let url = config.connection_url();
        info!(
            url = %mask_password(&url),
            driver = ?config.driver,
            max_connections = config.max_connections,
            "Connecting to database"
        );

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Successfully connected to database");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Begin a transaction.
    pub async fn begin(&self) -> AppResult<Transaction> {
        self.pool
            .begin()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
            })
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Run the zero-row select of every configured table.
    ///
    /// Fails when a table or column named by the descriptor is missing.
    pub async fn verify_schema(&self, builder: &QueryBuilder) -> AppResult<()> {
        for check in builder.schema_checks() {
            let rendered = check.render()?;
            debug!(sql = %rendered.sql, "Probing schema");
            rendered.query().fetch_all(&self.pool).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Schema check failed: {e}"),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Commit `tx`.
pub async fn commit(tx: Transaction) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
