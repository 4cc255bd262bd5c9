//! Application configuration schemas.
//!
//! The configuration is a single JSON file deserialized via the `config`
//! crate, with `FILEVAULT__`-prefixed environment variables layered on top.
//! Each sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::app::{Environment, WatcherConfig};
pub use self::auth::PasswordHashConfig;
pub use self::database::{
    CategColumns, DatabaseConfig, DatabaseDriver, FileColumns, SchemaConfig, TableConfig,
    UserColumns,
};
pub use self::logging::{LogFormat, LoggingConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment. Unrecognised values fall back to development.
    #[serde(default)]
    pub environment: Environment,
    /// Origins allowed by CORS.
    #[serde(default)]
    pub origins: Vec<String>,
    /// HTTP bind port.
    pub port: u16,
    /// Root directory of the entity tree.
    #[serde(default = "default_root")]
    pub root: String,
    /// Login name of the administrator row.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Display name of the administrator row.
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Database connection and schema descriptor.
    pub database: DatabaseConfig,
    /// HMAC secret used to sign bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in minutes.
    pub jwt_expires: i64,
    /// TLS certificate path (optional).
    #[serde(default)]
    pub cert_file: Option<String>,
    /// TLS private key path (optional).
    #[serde(default)]
    pub key_file: Option<String>,
    /// Argon2 cost parameters.
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
    /// Config file watcher settings.
    #[serde(default)]
    pub watcher: WatcherConfig,
    /// Upper bound on a single coordinator operation, in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
    /// Largest accepted request body in bytes. File content travels base64
    /// encoded inside the JSON body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// Environment variables prefixed with `FILEVAULT__` override file values
    /// (e.g. `FILEVAULT__PORT=9000`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .add_source(
                config::Environment::with_prefix("FILEVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to build config from '{}': {e}",
                    path.display()
                ))
            })?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Parse configuration from an in-memory JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .build()?;
        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Reject configurations that would deserialize but cannot work.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.port == 0 {
            return Err(AppError::configuration("'port' must be non-zero"));
        }
        if self.jwt_secret.is_empty() {
            return Err(AppError::configuration("'jwt_secret' must not be empty"));
        }
        if self.jwt_expires <= 0 {
            return Err(AppError::configuration(
                "'jwt_expires' must be a positive number of minutes",
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(AppError::configuration("'max_body_bytes' must be non-zero"));
        }
        if self.root.trim().is_empty() {
            return Err(AppError::configuration("'root' must not be empty"));
        }
        self.database.validate()
    }

    /// Whether switching from `self` to `next` needs the HTTP server rebuilt.
    ///
    /// The database handle and the remaining fields are swapped live.
    pub fn requires_restart(&self, next: &AppConfig) -> bool {
        next.port != self.port
            || next.environment != self.environment
            || next.root != self.root
            || (next.environment == Environment::Development
                && (next.cert_file != self.cert_file || next.key_file != self.key_file))
    }

    /// Token lifetime as a `chrono` duration.
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt_expires)
    }

    /// Coordinator operation timeout.
    pub fn operation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.operation_timeout_secs)
    }
}

fn default_root() -> String {
    "./data".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_name() -> String {
    "Administrador".to_string()
}

fn default_operation_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}
