//! Dual-store coordinator.
//!
//! Every mutation touches the database and the entity tree. The database
//! write happens inside a transaction that is committed last; filesystem
//! steps that have already been applied are undone by a [`Rollback`] guard
//! when a later step fails.

mod category;
mod file;
mod rollback;
mod user;

use std::future::Future;
use std::path::Path;

use tracing::warn;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::EntityStore;
use filevault_core::types::{CategoryId, UserId};

use crate::context::{Context, Snapshot};

pub(crate) use rollback::{Compensation, DeletedRow, Rollback};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password: String,
}

/// Fields of a user that may change. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}

/// Fields of a category that may change. A new `user_id` moves it.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub user_id: Option<UserId>,
    pub name: Option<String>,
}

/// Input for creating a file.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub extension: String,
    pub mimetype: String,
    pub content: Vec<u8>,
}

/// Fields of a file that may change. A new `categ_id` moves it; new
/// `content` replaces the payload.
#[derive(Debug, Clone, Default)]
pub struct FileChanges {
    pub categ_id: Option<CategoryId>,
    pub name: Option<String>,
    pub extension: Option<String>,
    pub mimetype: Option<String>,
    pub content: Option<Vec<u8>>,
}

/// Creates, updates and deletes users, categories and files in both stores.
#[derive(Debug, Clone)]
pub struct Coordinator {
    context: Context,
}

impl Coordinator {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn store(&self) -> &dyn EntityStore {
        self.context.store()
    }
}

/// Run `operation` under the snapshot's operation timeout.
///
/// On timeout the future is dropped, which rolls back any open transaction.
/// Callers settle their [`Rollback`] after this returns, so filesystem steps
/// the dropped work had started are still compensated.
async fn bounded<T>(
    snapshot: &Snapshot,
    operation: &'static str,
    fut: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    let limit = snapshot.config.operation_timeout();
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_secs = limit.as_secs(), "Operation timed out");
            Err(AppError::internal(format!("Operation '{operation}' timed out")))
        }
    }
}

fn required(value: &str, field: &str) -> AppResult<String> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("'{field}' must not be empty")));
    }
    Ok(value.to_string())
}

/// Fail with `ParentMissing` unless the directory holding `path` exists.
async fn ensure_parent(store: &dyn EntityStore, path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if store.entity_exists(parent).await => Ok(()),
        _ => Err(AppError::parent_missing(format!(
            "Parent directory does not exist: {}",
            path.display()
        ))),
    }
}
