//! User repository implementation.

use sqlx::AnyConnection;
use sqlx::any::AnyRow;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{EntityKind, User, UserCredentials, UserId};

use super::{column, execute_one, fetch_all, id_column};
use crate::builder::QueryBuilder;
use crate::connection::DatabasePool;

/// Repository for user reads and transactional writes.
#[derive(Debug, Clone, Copy)]
pub struct UserRepository<'a> {
    db: &'a DatabasePool,
    builder: &'a QueryBuilder,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    pub fn new(db: &'a DatabasePool, builder: &'a QueryBuilder) -> Self {
        Self { db, builder }
    }

    /// List every user.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        fetch_all(self.db.pool(), self.builder.select_all_users())
            .await?
            .iter()
            .map(user_from_row)
            .collect()
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<User> {
        let rows = fetch_all(self.db.pool(), self.builder.select_user_by_id(id)).await?;
        match rows.first() {
            Some(row) => user_from_row(row),
            None => Err(AppError::not_found(format!("User {id} not found"))),
        }
    }

    /// Every row carrying `name`, with its password hash. Login only.
    pub async fn find_credentials_by_name(&self, name: &str) -> AppResult<Vec<UserCredentials>> {
        fetch_all(self.db.pool(), self.builder.select_credentials_by_name(name))
            .await?
            .iter()
            .map(|row| {
                Ok(UserCredentials {
                    id: id_column(row, "id")?,
                    name: column(row, "name")?,
                    password_hash: column(row, "password")?,
                })
            })
            .collect()
    }

    /// Ids of every user carrying `name`, read inside the caller's transaction.
    pub async fn find_ids_by_name(
        &self,
        conn: &mut AnyConnection,
        name: &str,
    ) -> AppResult<Vec<UserId>> {
        fetch_all(&mut *conn, self.builder.select_user_ids_by_name(name))
            .await?
            .iter()
            .map(|row| id_column(row, "id"))
            .collect()
    }

    /// Insert a user row.
    pub async fn insert(
        &self,
        conn: &mut AnyConnection,
        user: &User,
        password_hash: &str,
    ) -> AppResult<()> {
        execute_one(conn, self.builder.insert_user(user, password_hash), EntityKind::User).await
    }

    /// Update the changed columns of a user row.
    pub async fn update(
        &self,
        conn: &mut AnyConnection,
        old: &User,
        new: &User,
        password_hash: Option<&str>,
    ) -> AppResult<()> {
        execute_one(
            conn,
            self.builder.update_user(old, new, password_hash),
            EntityKind::User,
        )
        .await
    }

    /// Reset the password hash of a user row.
    pub async fn update_password(
        &self,
        conn: &mut AnyConnection,
        id: UserId,
        password_hash: &str,
        now: i64,
    ) -> AppResult<()> {
        execute_one(
            conn,
            self.builder.update_user_password(id, password_hash, now),
            EntityKind::User,
        )
        .await
    }

    /// Delete a user row.
    pub async fn delete(&self, conn: &mut AnyConnection, id: UserId) -> AppResult<()> {
        execute_one(conn, self.builder.delete_user(id), EntityKind::User).await
    }
}

fn user_from_row(row: &AnyRow) -> AppResult<User> {
    Ok(User {
        id: id_column(row, "id")?,
        name: column(row, "name")?,
        updated_at: column(row, "updated_at")?,
    })
}
