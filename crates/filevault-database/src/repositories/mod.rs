//! Repositories for users, categories and files.
//!
//! Reads go through the pool. Writes take a connection borrowed from the
//! caller's transaction so the coordinator decides when to commit.

pub mod category;
pub mod file;
pub mod user;

pub use category::CategoryRepository;
pub use file::FileRepository;
pub use user::UserRepository;

use std::str::FromStr;

use sqlx::any::AnyRow;
use sqlx::{Any, AnyConnection, Decode, Row, Type};

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::types::EntityKind;

use crate::builder::Statement;

/// Execute a mutation that must touch exactly one row.
///
/// Zero rows is `NotFound`; more than one is `MultipleRowsAffected`. A
/// unique violation on the user table is `DuplicateUser`.
pub(crate) async fn execute_one(
    conn: &mut AnyConnection,
    statement: Statement,
    kind: EntityKind,
) -> AppResult<()> {
    let rendered = statement.render()?;
    let result = rendered
        .query()
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(kind, e))?;

    match result.rows_affected() {
        1 => Ok(()),
        0 => Err(AppError::not_found(format!("No {kind} row matched"))),
        n => Err(AppError::multiple_rows(format!(
            "Expected one {kind} row to change, {n} did"
        ))),
    }
}

fn write_error(kind: EntityKind, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if kind == EntityKind::User && db.is_unique_violation() {
            return AppError::with_source(ErrorKind::DuplicateUser, "User name already taken", e);
        }
    }
    AppError::with_source(ErrorKind::Database, format!("Failed to write {kind} row"), e)
}

/// Run a SELECT and collect every row.
pub(crate) async fn fetch_all<'e, E>(executor: E, statement: Statement) -> AppResult<Vec<AnyRow>>
where
    E: sqlx::Executor<'e, Database = Any>,
{
    let rendered = statement.render()?;
    rendered
        .query()
        .fetch_all(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, format!("Query failed: {e}"), e))
}

pub(crate) fn column<'r, T>(row: &'r AnyRow, name: &str) -> AppResult<T>
where
    T: Decode<'r, Any> + Type<Any>,
{
    row.try_get(name).map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Failed to decode '{name}'"), e)
    })
}

pub(crate) fn id_column<I>(row: &AnyRow, name: &str) -> AppResult<I>
where
    I: FromStr<Err = uuid::Error>,
{
    let text: String = column(row, name)?;
    text.parse().map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Malformed id in '{name}': '{text}'"),
            e,
        )
    })
}
