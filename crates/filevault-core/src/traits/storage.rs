//! Entity store trait for the filesystem side of the repository.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{EntityKind, EntityLayout};

/// Typed create/exists/rename/delete over the entity tree.
///
/// The trait is defined here in `filevault-core` and implemented in
/// `filevault-storage`. Every path passed in is expected to lie under
/// [`EntityStore::layout`]'s root.
#[async_trait]
pub trait EntityStore: Send + Sync + std::fmt::Debug + 'static {
    /// Path layout rooted at this store's root directory.
    fn layout(&self) -> &EntityLayout;

    /// Create the entity at `path`.
    ///
    /// Fails with `AlreadyExists` if the path exists, `InvalidPath` if the
    /// basename is not a UUID, and `MissingContent` for a file without bytes.
    async fn create_entity(
        &self,
        path: &Path,
        content: Option<&[u8]>,
        kind: EntityKind,
    ) -> AppResult<()>;

    /// Whether anything exists at `path`. Stat errors other than not-found
    /// count as existing.
    async fn entity_exists(&self, path: &Path) -> bool;

    /// Rename `old` to `new`. Fails with `NotEmpty` for a non-empty directory.
    async fn update_entity(&self, old: &Path, new: &Path) -> AppResult<()>;

    /// Atomically move the regular file `source` over the regular file
    /// `target`, replacing its content in one step.
    async fn replace_entity(&self, source: &Path, target: &Path) -> AppResult<()>;

    /// Remove the single entity at `path`. Fails with `NotEmpty` for a
    /// non-empty directory.
    async fn delete_entity(&self, path: &Path) -> AppResult<()>;

    /// Read a whole file into memory.
    async fn read_entity(&self, path: &Path) -> AppResult<Vec<u8>>;

    /// Fail with `NotEmpty` if `path` is a directory with entries.
    async fn ensure_empty(&self, path: &Path) -> AppResult<()>;
}
