//! CLI command definitions and dispatch.

pub mod admin;
pub mod migrate;

use clap::{Parser, Subcommand};

use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_database::{DatabasePool, QueryBuilder};

/// FileVault: multi-tenant file repository administration
#[derive(Debug, Parser)]
#[command(name = "filevault", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the user, category and file tables
    Migrate,
    /// Administrator account management
    Admin(admin::AdminArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Admin(args) => admin::execute(args, &self.config).await,
        }
    }
}

/// Load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Open the configured database and the statement builder for its schema.
pub async fn open_database(config: &AppConfig) -> Result<(DatabasePool, QueryBuilder), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    let builder = QueryBuilder::new(config.database.schema.clone(), config.database.driver);
    Ok((db, builder))
}
