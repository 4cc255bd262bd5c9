//! User mutations.

use tracing::info;

use filevault_auth::{PasswordHasher, PasswordValidator};
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{EntityKind, User, UserId, unix_now};
use filevault_database::commit;

use super::{
    Compensation, Coordinator, DeletedRow, NewUser, Rollback, UserChanges, bounded, required,
};
use crate::context::Snapshot;

impl Coordinator {
    /// Insert a user row and create its directory.
    pub async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let snapshot = self.context.snapshot();
        self.create_user_in(&snapshot, input).await
    }

    /// Apply `changes` to `old`. Users have no filesystem side.
    pub async fn update_user(&self, old: &User, changes: UserChanges) -> AppResult<User> {
        let snapshot = self.context.snapshot();
        bounded(&snapshot, "update_user", self.update_user_in(&snapshot, old, changes)).await
    }

    /// Delete a user row and its (empty) directory.
    pub async fn delete_user(&self, user: &User) -> AppResult<()> {
        let snapshot = self.context.snapshot();
        self.delete_user_in(&snapshot, user).await
    }

    async fn create_user_in(&self, snapshot: &Snapshot, input: NewUser) -> AppResult<User> {
        let name = required(&input.name, "name")?;
        PasswordValidator::new().validate(&input.password)?;
        let password_hash =
            PasswordHasher::new(&snapshot.config.password_hash)?.hash_password(&input.password)?;

        let store = self.store();
        let user = User {
            id: UserId::new(),
            name,
            updated_at: unix_now(),
        };
        let path = store.layout().user_dir(user.id);

        let mut rollback = Rollback::new("create_user", store, snapshot);
        let result = bounded(snapshot, "create_user", async {
            let users = snapshot.users();
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            if !users.find_ids_by_name(&mut tx, &user.name).await?.is_empty() {
                return Err(AppError::duplicate_user(format!(
                    "User name '{}' is already taken",
                    user.name
                )));
            }
            users
                .insert(&mut tx, &user, &password_hash)
                .await
                .map_err(|e| rollback.db(e))?;

            rollback.create_entity(&path, None, EntityKind::User).await?;

            commit(tx).await.map_err(|e| rollback.db(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(user_id = %user.id, name = %user.name, "User created");
        Ok(user)
    }

    async fn update_user_in(
        &self,
        snapshot: &Snapshot,
        old: &User,
        changes: UserChanges,
    ) -> AppResult<User> {
        let mut new = old.clone();
        if let Some(name) = changes.name {
            new.name = required(&name, "name")?;
        }
        let password_hash = match changes.password {
            Some(password) => {
                PasswordValidator::new().validate(&password)?;
                Some(PasswordHasher::new(&snapshot.config.password_hash)?.hash_password(&password)?)
            }
            None => None,
        };
        new.updated_at = unix_now();

        let mut tx = snapshot.db.begin().await?;
        snapshot
            .users()
            .update(&mut tx, old, &new, password_hash.as_deref())
            .await?;
        commit(tx).await?;

        info!(
            user_id = %new.id,
            renamed = new.name != old.name,
            password_changed = password_hash.is_some(),
            "User updated"
        );
        Ok(new)
    }

    async fn delete_user_in(&self, snapshot: &Snapshot, user: &User) -> AppResult<()> {
        let store = self.store();
        let path = store.layout().user_dir(user.id);
        store.ensure_empty(&path).await?;

        let password_hash = snapshot
            .users()
            .find_credentials_by_name(&user.name)
            .await?
            .into_iter()
            .find(|candidate| candidate.id == user.id)
            .map(|candidate| candidate.password_hash)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;

        let mut rollback = Rollback::new("delete_user", store, snapshot);
        let result = bounded(snapshot, "delete_user", async {
            let mut tx = snapshot.db.begin().await.map_err(|e| rollback.db(e))?;
            snapshot
                .users()
                .delete(&mut tx, user.id)
                .await
                .map_err(|e| rollback.db(e))?;
            rollback.arm(Compensation::Reinsert(DeletedRow::User {
                user: user.clone(),
                password_hash,
            }));
            commit(tx).await.map_err(|e| rollback.db(e))?;

            rollback.arm(Compensation::Recreate {
                path: path.clone(),
                kind: EntityKind::User,
                backup: None,
            });
            store.delete_entity(&path).await.map_err(|e| rollback.fs(e))?;
            rollback.disarm();
            Ok::<_, AppError>(())
        })
        .await;
        rollback.settle(result).await?;

        info!(user_id = %user.id, "User deleted");
        Ok(())
    }
}
