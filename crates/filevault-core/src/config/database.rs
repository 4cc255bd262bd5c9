//! Database connection and schema descriptor configuration.
//!
//! Table and column names are part of the configuration, not the code. The
//! names end up interpolated into SQL text, so [`SchemaConfig::validate`]
//! only admits plain identifiers.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Supported database drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// PostgreSQL via `postgres://` URLs.
    #[default]
    Postgres,
    /// SQLite; `service` is the database file path.
    Sqlite,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver used to open the pool.
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database (service) name, or the file path for SQLite.
    #[serde(default)]
    pub service: String,
    /// Login user.
    #[serde(default)]
    pub username: String,
    /// Server host name.
    #[serde(default)]
    pub server: String,
    /// Server port.
    #[serde(default)]
    pub port: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Physical table and column names.
    #[serde(default)]
    pub schema: SchemaConfig,
}

impl DatabaseConfig {
    /// Build the connection URL understood by the `sqlx` any-driver.
    pub fn connection_url(&self) -> String {
        match self.driver {
            DatabaseDriver::Postgres => {
                let port = if self.port.is_empty() { "5432" } else { &self.port };
                format!(
                    "postgres://{}:{}@{}:{}/{}",
                    self.username, self.password, self.server, port, self.service
                )
            }
            DatabaseDriver::Sqlite => format!("sqlite://{}?mode=rwc", self.service),
        }
    }

    /// Validate connection fields and the schema descriptor.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.service.is_empty() {
            return Err(AppError::configuration("'database.service' must not be empty"));
        }
        if self.driver == DatabaseDriver::Postgres && self.server.is_empty() {
            return Err(AppError::configuration(
                "'database.server' is required for postgres",
            ));
        }
        self.schema.validate()
    }
}

/// A configured table: physical name plus its column map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig<C> {
    /// Physical table name.
    pub name: String,
    /// Physical column names.
    pub columns: C,
}

/// Columns of the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserColumns {
    pub user_id: String,
    pub name: String,
    pub password: String,
    pub updated_at: String,
}

/// Columns of the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategColumns {
    pub categ_id: String,
    pub user_id: String,
    pub name: String,
    pub updated_at: String,
}

/// Columns of the file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileColumns {
    pub file_id: String,
    pub categ_id: String,
    pub name: String,
    pub extension: String,
    pub mimetype: String,
    pub updated_at: String,
}

/// Schema descriptor: the physical names every statement is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Schema qualifier; empty means unqualified table names.
    #[serde(default)]
    pub name: String,
    pub user_table: TableConfig<UserColumns>,
    pub categ_table: TableConfig<CategColumns>,
    pub file_table: TableConfig<FileColumns>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            user_table: TableConfig {
                name: "users".into(),
                columns: UserColumns {
                    user_id: "user_id".into(),
                    name: "name".into(),
                    password: "password".into(),
                    updated_at: "updated_at".into(),
                },
            },
            categ_table: TableConfig {
                name: "categories".into(),
                columns: CategColumns {
                    categ_id: "categ_id".into(),
                    user_id: "user_id".into(),
                    name: "name".into(),
                    updated_at: "updated_at".into(),
                },
            },
            file_table: TableConfig {
                name: "files".into(),
                columns: FileColumns {
                    file_id: "file_id".into(),
                    categ_id: "categ_id".into(),
                    name: "name".into(),
                    extension: "extension".into(),
                    mimetype: "mimetype".into(),
                    updated_at: "updated_at".into(),
                },
            },
        }
    }
}

impl SchemaConfig {
    /// Every configured name must be a plain SQL identifier.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.name.is_empty() {
            check_identifier("schema.name", &self.name)?;
        }

        let u = &self.user_table;
        check_identifier("user_table.name", &u.name)?;
        check_identifier("user_table.columns.user_id", &u.columns.user_id)?;
        check_identifier("user_table.columns.name", &u.columns.name)?;
        check_identifier("user_table.columns.password", &u.columns.password)?;
        check_identifier("user_table.columns.updated_at", &u.columns.updated_at)?;

        let c = &self.categ_table;
        check_identifier("categ_table.name", &c.name)?;
        check_identifier("categ_table.columns.categ_id", &c.columns.categ_id)?;
        check_identifier("categ_table.columns.user_id", &c.columns.user_id)?;
        check_identifier("categ_table.columns.name", &c.columns.name)?;
        check_identifier("categ_table.columns.updated_at", &c.columns.updated_at)?;

        let f = &self.file_table;
        check_identifier("file_table.name", &f.name)?;
        check_identifier("file_table.columns.file_id", &f.columns.file_id)?;
        check_identifier("file_table.columns.categ_id", &f.columns.categ_id)?;
        check_identifier("file_table.columns.name", &f.columns.name)?;
        check_identifier("file_table.columns.extension", &f.columns.extension)?;
        check_identifier("file_table.columns.mimetype", &f.columns.mimetype)?;
        check_identifier("file_table.columns.updated_at", &f.columns.updated_at)?;

        Ok(())
    }
}

fn check_identifier(field: &str, value: &str) -> Result<(), AppError> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::configuration(format!(
            "'database.schema.{field}' is not a valid identifier: '{value}'"
        )))
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    10
}
