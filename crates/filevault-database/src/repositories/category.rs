//! Category repository implementation.

use sqlx::AnyConnection;
use sqlx::any::AnyRow;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{Category, CategoryId, EntityKind, UserId};

use super::{column, execute_one, fetch_all, id_column};
use crate::builder::QueryBuilder;
use crate::connection::DatabasePool;

/// Repository for category reads and transactional writes.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRepository<'a> {
    db: &'a DatabasePool,
    builder: &'a QueryBuilder,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(db: &'a DatabasePool, builder: &'a QueryBuilder) -> Self {
        Self { db, builder }
    }

    /// Categories owned by `user_id`.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Category>> {
        fetch_all(self.db.pool(), self.builder.select_categories_by_user(user_id))
            .await?
            .iter()
            .map(category_from_row)
            .collect()
    }

    /// Find a category by primary key.
    pub async fn find_by_id(&self, id: CategoryId) -> AppResult<Category> {
        let rows = fetch_all(self.db.pool(), self.builder.select_category_by_id(id)).await?;
        match rows.first() {
            Some(row) => category_from_row(row),
            None => Err(AppError::not_found(format!("Category {id} not found"))),
        }
    }

    pub async fn insert(&self, conn: &mut AnyConnection, category: &Category) -> AppResult<()> {
        execute_one(conn, self.builder.insert_category(category), EntityKind::Category).await
    }

    pub async fn update(
        &self,
        conn: &mut AnyConnection,
        old: &Category,
        new: &Category,
    ) -> AppResult<()> {
        execute_one(
            conn,
            self.builder.update_category(old, new),
            EntityKind::Category,
        )
        .await
    }

    pub async fn delete(&self, conn: &mut AnyConnection, id: CategoryId) -> AppResult<()> {
        execute_one(conn, self.builder.delete_category(id), EntityKind::Category).await
    }
}

fn category_from_row(row: &AnyRow) -> AppResult<Category> {
    Ok(Category {
        id: id_column(row, "id")?,
        user_id: id_column(row, "user_id")?,
        name: column(row, "name")?,
        updated_at: column(row, "updated_at")?,
    })
}
