//! Category mutations.

use tracing::info;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{Category, CategoryId, EntityKind, UserId, unix_now};
use filevault_database::commit;

use super::{
    CategoryChanges, Compensation, Coordinator, DeletedRow, NewCategory, Rollback, bounded,
    ensure_parent, required,
};
use crate::context::Snapshot;

impl Coordinator {
    /// Insert a category row and create its directory under `user_id`.
    pub async fn create_category(
        &self,
        user_id: UserId,
        input: NewCategory,
    ) -> AppResult<Category> {
        let snapshot = self.context.snapshot();
        self.create_category_in(&snapshot, user_id, input).await
    }

    /// Rename a category, or move it to another user.
    ///
    /// Only an empty category can move; the directory rename refuses
    /// non-empty directories and the row update is rolled back.
    pub async fn update_category(
        &self,
        old: &Category,
        changes: CategoryChanges,
    ) -> AppResult<Category> {
        let snapshot = self.context.snapshot();
        self.update_category_in(&snapshot, old, changes).await
    }

    /// Delete a category row and its (empty) directory.
    pub async fn delete_category(&self, category: &Category) -> AppResult<()> {
        let snapshot = self.context.snapshot();
        self.delete_category_in(&snapshot, category).await
    }

    async fn create_category_in(
        &self,
        snapshot: &Snapshot,
        user_id: UserId,
        input: NewCategory,
    ) -> AppResult<Category> {
        let store = self.store();
        let category = Category {
            id: CategoryId::new(),
            user_id,
            name: required(&input.name, "name")?,
            updated_at: unix_now(),
        };
        let path = store.layout().category_dir(user_id, category.id);
        ensure_parent(store, &path).await?;

        let mut rollback = Rollback::new("create_category", store, snapshot);
        let result = bounded(snapshot, "create_category", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .categories()
                .insert(&mut tx, &category)
                .await
                .map_err(|e| rollback.db(e))?;

            rollback.create_entity(&path, None, EntityKind::Category).await?;

            commit(tx).await.map_err(|e| rollback.db(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(user_id = %user_id, categ_id = %category.id, "Category created");
        Ok(category)
    }

    async fn update_category_in(
        &self,
        snapshot: &Snapshot,
        old: &Category,
        changes: CategoryChanges,
    ) -> AppResult<Category> {
        let mut new = old.clone();
        if let Some(user_id) = changes.user_id {
            new.user_id = user_id;
        }
        if let Some(name) = changes.name {
            new.name = required(&name, "name")?;
        }
        new.updated_at = unix_now();

        let store = self.store();
        let old_path = store.layout().category_dir(old.user_id, old.id);
        let new_path = store.layout().category_dir(new.user_id, new.id);
        ensure_parent(store, &new_path).await?;

        let mut rollback = Rollback::new("update_category", store, snapshot);
        let result = bounded(snapshot, "update_category", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .categories()
                .update(&mut tx, old, &new)
                .await
                .map_err(|e| rollback.db(e))?;

            if old_path != new_path {
                rollback.move_entity(&old_path, &new_path).await?;
            }

            commit(tx).await.map_err(|e| rollback.db(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(
            categ_id = %new.id,
            moved = old.user_id != new.user_id,
            "Category updated"
        );
        Ok(new)
    }

    async fn delete_category_in(&self, snapshot: &Snapshot, category: &Category) -> AppResult<()> {
        let store = self.store();
        let path = store.layout().category_dir(category.user_id, category.id);
        store.ensure_empty(&path).await?;

        let mut rollback = Rollback::new("delete_category", store, snapshot);
        let result = bounded(snapshot, "delete_category", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .categories()
                .delete(&mut tx, category.id)
                .await
                .map_err(|e| rollback.db(e))?;
            rollback.arm(Compensation::Reinsert(DeletedRow::Category(category.clone())));
            commit(tx).await.map_err(|e| rollback.db(e))?;

            rollback.arm(Compensation::Recreate {
                path: path.clone(),
                kind: EntityKind::Category,
                backup: None,
            });
            store.delete_entity(&path).await.map_err(|e| rollback.fs(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(categ_id = %category.id, "Category deleted");
        Ok(())
    }
}
