//! # filevault-database
//!
//! Database connection management for FileVault, the schema-parameterised
//! SQL builder, schema creation and probing, and the user/category/file
//! repositories.
//!
//! Table and column names come from the configured schema descriptor. The
//! pool uses the `sqlx` any-driver so the same statements run on PostgreSQL
//! and SQLite.

pub mod builder;
pub mod connection;
pub mod migration;
pub mod repositories;

pub use builder::{QueryBuilder, Statement};
pub use connection::{DatabasePool, Transaction, commit};
pub use repositories::{CategoryRepository, FileRepository, UserRepository};
