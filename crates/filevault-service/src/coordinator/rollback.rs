//! Compensation guard for filesystem steps.

use std::path::{Path, PathBuf};

use tracing::{error, warn};

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::EntityStore;
use filevault_core::types::{Category, EntityKind, File, User};
use filevault_database::commit;

use crate::context::Snapshot;

/// A database row removed by a committed delete.
pub(crate) enum DeletedRow {
    User { user: User, password_hash: String },
    Category(Category),
    File(File),
}

/// An undo step, armed before the step it undoes.
///
/// Each variant checks the current state before acting, so running one for a
/// step that never took effect is a no-op.
pub(crate) enum Compensation {
    /// Remove whatever this operation wrote at the path, if anything.
    Remove(PathBuf),
    /// Move an entity back to where it was, if it was moved.
    Rename { from: PathBuf, to: PathBuf },
    /// Recreate a deleted entity unless it is still present.
    Recreate {
        path: PathBuf,
        kind: EntityKind,
        backup: Option<Vec<u8>>,
    },
    /// Insert a deleted row again in a fresh transaction, unless it is still
    /// present.
    Reinsert(DeletedRow),
}

impl Compensation {
    fn describe(&self) -> String {
        match self {
            Self::Remove(path) => format!("remove {}", path.display()),
            Self::Rename { from, to } => format!("rename {} to {}", from.display(), to.display()),
            Self::Recreate { path, kind, .. } => format!("recreate {kind} {}", path.display()),
            Self::Reinsert(DeletedRow::User { user, .. }) => format!("reinsert user {}", user.id),
            Self::Reinsert(DeletedRow::Category(category)) => {
                format!("reinsert category {}", category.id)
            }
            Self::Reinsert(DeletedRow::File(file)) => format!("reinsert file {}", file.id),
        }
    }
}

/// Tracks what has to be undone if an operation does not complete.
///
/// Compensations are armed before the step they undo and run in reverse
/// order when the operation settles with an error, including a deadline that
/// dropped the work mid-step. Arming takes the place of per-side failure
/// flags: `db_failed` and `fs_failed` only annotate the log record. After a
/// successful commit the guard is disarmed. The transaction itself is not
/// held here: dropping it rolls it back.
pub(crate) struct Rollback<'a> {
    operation: &'static str,
    store: &'a dyn EntityStore,
    snapshot: &'a Snapshot,
    db_failed: bool,
    fs_failed: bool,
    compensations: Vec<Compensation>,
}

impl<'a> Rollback<'a> {
    pub(crate) fn new(
        operation: &'static str,
        store: &'a dyn EntityStore,
        snapshot: &'a Snapshot,
    ) -> Self {
        Self {
            operation,
            store,
            snapshot,
            db_failed: false,
            fs_failed: false,
            compensations: Vec::new(),
        }
    }

    pub(crate) fn arm(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    /// Create an entity with its removal armed first, so a partial write is
    /// cleaned up as well. An entity that was already there is left alone.
    pub(crate) async fn create_entity(
        &mut self,
        path: &Path,
        content: Option<&[u8]>,
        kind: EntityKind,
    ) -> AppResult<()> {
        self.arm(Compensation::Remove(path.to_path_buf()));
        let store = self.store;
        match store.create_entity(path, content, kind).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if e.kind == ErrorKind::AlreadyExists {
                    self.compensations.pop();
                }
                Err(self.fs(e))
            }
        }
    }

    /// Rename an entity with the inverse move armed first.
    pub(crate) async fn move_entity(&mut self, from: &Path, to: &Path) -> AppResult<()> {
        self.arm(Compensation::Rename {
            from: to.to_path_buf(),
            to: from.to_path_buf(),
        });
        let store = self.store;
        store.update_entity(from, to).await.map_err(|e| self.fs(e))
    }

    pub(crate) fn disarm(&mut self) {
        self.compensations.clear();
    }

    /// Record a database-side failure and pass the error through.
    pub(crate) fn db(&mut self, e: AppError) -> AppError {
        self.db_failed = true;
        e
    }

    /// Record a filesystem-side failure and pass the error through.
    pub(crate) fn fs(&mut self, e: AppError) -> AppError {
        self.fs_failed = true;
        e
    }

    /// Run the armed compensations if `result` is an error, then return it.
    ///
    /// Compensation failures are logged and never replace the original error.
    pub(crate) async fn settle<T>(mut self, result: AppResult<T>) -> AppResult<T> {
        let Err(cause) = &result else {
            return result;
        };
        if self.compensations.is_empty() {
            return result;
        }

        warn!(
            operation = self.operation,
            db_failed = self.db_failed,
            fs_failed = self.fs_failed,
            error = %cause,
            "Compensating failed operation"
        );

        let compensations = std::mem::take(&mut self.compensations);
        for compensation in compensations.into_iter().rev() {
            let step = compensation.describe();
            if let Err(e) = self.run(compensation).await {
                error!(
                    operation = self.operation,
                    kind = %ErrorKind::IntegrityViolation,
                    step = %step,
                    error = %e,
                    "Compensation failed; database and filesystem disagree"
                );
            }
        }
        result
    }

    async fn run(&self, compensation: Compensation) -> AppResult<()> {
        match compensation {
            Compensation::Remove(path) => {
                if !self.store.entity_exists(&path).await {
                    return Ok(());
                }
                self.store.delete_entity(&path).await
            }
            Compensation::Rename { from, to } => {
                if !self.store.entity_exists(&from).await {
                    return Ok(());
                }
                self.store.update_entity(&from, &to).await
            }
            Compensation::Recreate { path, kind, backup } => {
                if self.store.entity_exists(&path).await {
                    return Ok(());
                }
                self.store
                    .create_entity(&path, backup.as_deref(), kind)
                    .await
            }
            Compensation::Reinsert(row) => {
                if self.row_exists(&row).await? {
                    return Ok(());
                }
                let mut tx = self.snapshot.db.begin().await?;
                match &row {
                    DeletedRow::User {
                        user,
                        password_hash,
                    } => self.snapshot.users().insert(&mut tx, user, password_hash).await?,
                    DeletedRow::Category(category) => {
                        self.snapshot.categories().insert(&mut tx, category).await?
                    }
                    DeletedRow::File(file) => self.snapshot.files().insert(&mut tx, file).await?,
                }
                commit(tx).await
            }
        }
    }

    async fn row_exists(&self, row: &DeletedRow) -> AppResult<bool> {
        let snapshot = self.snapshot;
        let found = match row {
            DeletedRow::User { user, .. } => snapshot.users().find_by_id(user.id).await.map(drop),
            DeletedRow::Category(category) => {
                snapshot.categories().find_by_id(category.id).await.map(drop)
            }
            DeletedRow::File(file) => snapshot.files().find_by_id(file.id).await.map(drop),
        };
        match found {
            Ok(()) => Ok(true),
            Err(e) if e.kind == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
