//! File metadata repository implementation.

use sqlx::AnyConnection;
use sqlx::any::AnyRow;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{CategoryId, EntityKind, File, FileId};

use super::{column, execute_one, fetch_all, id_column};
use crate::builder::QueryBuilder;
use crate::connection::DatabasePool;

/// Repository for file metadata reads and transactional writes.
#[derive(Debug, Clone, Copy)]
pub struct FileRepository<'a> {
    db: &'a DatabasePool,
    builder: &'a QueryBuilder,
}

impl<'a> FileRepository<'a> {
    pub fn new(db: &'a DatabasePool, builder: &'a QueryBuilder) -> Self {
        Self { db, builder }
    }

    /// Files stored in `categ_id`.
    pub async fn find_by_category(&self, categ_id: CategoryId) -> AppResult<Vec<File>> {
        fetch_all(self.db.pool(), self.builder.select_files_by_category(categ_id))
            .await?
            .iter()
            .map(file_from_row)
            .collect()
    }

    /// Find a file by primary key.
    pub async fn find_by_id(&self, id: FileId) -> AppResult<File> {
        let rows = fetch_all(self.db.pool(), self.builder.select_file_by_id(id)).await?;
        match rows.first() {
            Some(row) => file_from_row(row),
            None => Err(AppError::not_found(format!("File {id} not found"))),
        }
    }

    pub async fn insert(&self, conn: &mut AnyConnection, file: &File) -> AppResult<()> {
        execute_one(conn, self.builder.insert_file(file), EntityKind::File).await
    }

    pub async fn update(&self, conn: &mut AnyConnection, old: &File, new: &File) -> AppResult<()> {
        execute_one(conn, self.builder.update_file(old, new), EntityKind::File).await
    }

    pub async fn delete(&self, conn: &mut AnyConnection, id: FileId) -> AppResult<()> {
        execute_one(conn, self.builder.delete_file(id), EntityKind::File).await
    }
}

fn file_from_row(row: &AnyRow) -> AppResult<File> {
    Ok(File {
        id: id_column(row, "id")?,
        categ_id: id_column(row, "categ_id")?,
        name: column(row, "name")?,
        extension: column(row, "extension")?,
        mimetype: column(row, "mimetype")?,
        updated_at: column(row, "updated_at")?,
    })
}
