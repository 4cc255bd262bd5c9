//! File mutations.

use std::path::Path;

use tracing::{error, info, warn};

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::types::layout::normalize_extension;
use filevault_core::types::{Category, EntityKind, File, FileId, unix_now};
use filevault_database::commit;

use super::{
    Compensation, Coordinator, DeletedRow, FileChanges, NewFile, Rollback, bounded, ensure_parent,
    required,
};
use crate::context::Snapshot;

/// What happens to the payload during an update.
#[derive(Clone, Copy)]
enum Payload<'a> {
    /// Metadata only; the file is renamed if its path changes.
    Keep,
    /// New bytes written to a different path; the old file is removed after commit.
    Replace(&'a [u8]),
    /// New bytes for the same path, written to a staging sibling first.
    Stage(&'a [u8]),
}

impl Coordinator {
    /// Insert a file row and write its payload into `category`.
    pub async fn create_file(&self, category: &Category, input: NewFile) -> AppResult<File> {
        let snapshot = self.context.snapshot();
        self.create_file_in(&snapshot, category, input).await
    }

    /// Update metadata, move to another category, and/or replace the payload.
    pub async fn update_file(
        &self,
        category: &Category,
        old: &File,
        changes: FileChanges,
    ) -> AppResult<File> {
        let snapshot = self.context.snapshot();
        self.update_file_in(&snapshot, category, old, changes).await
    }

    /// Delete a file row and its payload. The payload is read first so it can
    /// be restored if the removal fails.
    pub async fn delete_file(&self, category: &Category, file: &File) -> AppResult<()> {
        let snapshot = self.context.snapshot();
        self.delete_file_in(&snapshot, category, file).await
    }

    async fn create_file_in(
        &self,
        snapshot: &Snapshot,
        category: &Category,
        input: NewFile,
    ) -> AppResult<File> {
        let store = self.store();
        let file = File {
            id: FileId::new(),
            categ_id: category.id,
            name: required(&input.name, "name")?,
            extension: normalize_extension(&input.extension)?,
            mimetype: input.mimetype,
            updated_at: unix_now(),
        };
        let path = store
            .layout()
            .file_path(category.user_id, category.id, file.id, &file.extension);
        ensure_parent(store, &path).await?;

        let mut rollback = Rollback::new("create_file", store, snapshot);
        let result = bounded(snapshot, "create_file", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .files()
                .insert(&mut tx, &file)
                .await
                .map_err(|e| rollback.db(e))?;

            rollback
                .create_entity(&path, Some(&input.content), EntityKind::File)
                .await?;

            commit(tx).await.map_err(|e| rollback.db(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(
            categ_id = %category.id,
            file_id = %file.id,
            bytes = input.content.len(),
            "File created"
        );
        Ok(file)
    }

    async fn update_file_in(
        &self,
        snapshot: &Snapshot,
        category: &Category,
        old: &File,
        changes: FileChanges,
    ) -> AppResult<File> {
        check_membership(category, old)?;

        let mut new = old.clone();
        if let Some(categ_id) = changes.categ_id {
            new.categ_id = categ_id;
        }
        if let Some(name) = changes.name {
            new.name = required(&name, "name")?;
        }
        if let Some(extension) = changes.extension {
            new.extension = normalize_extension(&extension)?;
        }
        if let Some(mimetype) = changes.mimetype {
            new.mimetype = mimetype;
        }
        new.updated_at = unix_now();

        let new_owner = if new.categ_id == old.categ_id {
            category.user_id
        } else {
            snapshot.categories().find_by_id(new.categ_id).await?.user_id
        };

        let store = self.store();
        let layout = store.layout();
        let old_path = layout.file_path(category.user_id, old.categ_id, old.id, &old.extension);
        let new_path = layout.file_path(new_owner, new.categ_id, new.id, &new.extension);
        ensure_parent(store, &new_path).await?;

        let payload = match changes.content.as_deref() {
            None => Payload::Keep,
            Some(bytes) if new_path != old_path => Payload::Replace(bytes),
            Some(bytes) => Payload::Stage(bytes),
        };
        let staging = layout.staging_path(new_owner, new.categ_id, &new.extension);

        let mut rollback = Rollback::new("update_file", store, snapshot);
        let result = bounded(snapshot, "update_file", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .files()
                .update(&mut tx, old, &new)
                .await
                .map_err(|e| rollback.db(e))?;

            match payload {
                Payload::Keep if old_path != new_path => {
                    rollback.move_entity(&old_path, &new_path).await?;
                }
                Payload::Keep => {}
                Payload::Replace(bytes) => {
                    rollback
                        .create_entity(&new_path, Some(bytes), EntityKind::File)
                        .await?;
                }
                Payload::Stage(bytes) => {
                    rollback
                        .create_entity(&staging, Some(bytes), EntityKind::File)
                        .await?;
                }
            }

            commit(tx).await.map_err(|e| rollback.db(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        match payload {
            Payload::Keep => {}
            Payload::Replace(_) => {
                if let Err(e) = store.delete_entity(&old_path).await {
                    warn!(
                        file_id = %new.id,
                        path = %old_path.display(),
                        error = %e,
                        "Failed to remove replaced payload"
                    );
                }
            }
            Payload::Stage(_) => self.promote_staging(&staging, &new_path, new.id).await?,
        }

        info!(
            file_id = %new.id,
            moved = new.categ_id != old.categ_id,
            content_replaced = !matches!(payload, Payload::Keep),
            "File updated"
        );
        Ok(new)
    }

    /// Swap a committed staging payload over the live one in a single rename.
    ///
    /// On failure the old payload stays in place, so the row still has a file.
    async fn promote_staging(
        &self,
        staging: &Path,
        target: &Path,
        file_id: FileId,
    ) -> AppResult<()> {
        let store = self.store();
        if let Err(e) = store.replace_entity(staging, target).await {
            if let Err(cleanup) = store.delete_entity(staging).await {
                warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging file");
            }
            error!(
                file_id = %file_id,
                kind = %ErrorKind::IntegrityViolation,
                error = %e,
                "Committed new metadata but kept the old payload"
            );
            return Err(e);
        }
        Ok(())
    }

    async fn delete_file_in(
        &self,
        snapshot: &Snapshot,
        category: &Category,
        file: &File,
    ) -> AppResult<()> {
        check_membership(category, file)?;
        let store = self.store();
        let path = store
            .layout()
            .file_path(category.user_id, file.categ_id, file.id, &file.extension);
        let backup = store.read_entity(&path).await?;

        let mut rollback = Rollback::new("delete_file", store, snapshot);
        let result = bounded(snapshot, "delete_file", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .files()
                .delete(&mut tx, file.id)
                .await
                .map_err(|e| rollback.db(e))?;
            rollback.arm(Compensation::Reinsert(DeletedRow::File(file.clone())));
            commit(tx).await.map_err(|e| rollback.db(e))?;

            rollback.arm(Compensation::Recreate {
                path: path.clone(),
                kind: EntityKind::File,
                backup: Some(backup),
            });
            store.delete_entity(&path).await.map_err(|e| rollback.fs(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(file_id = %file.id, "File deleted");
        Ok(())
    }
}

fn check_membership(category: &Category, file: &File) -> AppResult<()> {
    if file.categ_id != category.id {
        return Err(AppError::not_found(format!(
            "File {} is not in category {}",
            file.id, category.id
        )));
    }
    Ok(())
}
