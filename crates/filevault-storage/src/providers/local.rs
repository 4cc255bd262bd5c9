//! Local filesystem entity store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::EntityStore;
use filevault_core::types::{EntityKind, EntityLayout};

/// Local filesystem entity store.
#[derive(Debug, Clone)]
pub struct LocalEntityStore {
    layout: EntityLayout,
}

impl LocalEntityStore {
    /// Create a store rooted at the given path, creating the root if needed.
    pub async fn new(root_path: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root_path.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            layout: EntityLayout::new(root),
        })
    }

    /// Whether `path` is a directory holding at least one entry.
    async fn is_non_empty_dir(&self, path: &Path) -> AppResult<bool> {
        let meta = match fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) => return Err(stat_error(path, e)),
        };
        if !meta.is_dir() {
            return Ok(false);
        }

        let mut dir = fs::read_dir(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {}", path.display()),
                e,
            )
        })?;
        let first = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })?;
        Ok(first.is_some())
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> AppResult<()> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await
            .map_err(|e| open_error(path, e))?;

        let mut writer = BufWriter::new(file);
        let mut remaining = content;
        while !remaining.is_empty() {
            let written = writer.write(remaining).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write file: {}", path.display()),
                    e,
                )
            })?;
            if written == 0 {
                return Err(AppError::storage(format!(
                    "Write returned zero bytes: {}",
                    path.display()
                )));
            }
            remaining = &remaining[written..];
        }

        writer
            .flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush file", e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to sync file", e))?;

        debug!(path = %path.display(), bytes = content.len(), "Wrote file");
        Ok(())
    }

    async fn create_dir(&self, path: &Path) -> AppResult<()> {
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o777);
        builder.create(path).await.map_err(|e| open_error(path, e))?;

        debug!(path = %path.display(), "Created directory");
        Ok(())
    }
}

#[async_trait]
impl EntityStore for LocalEntityStore {
    fn layout(&self) -> &EntityLayout {
        &self.layout
    }

    async fn create_entity(
        &self,
        path: &Path,
        content: Option<&[u8]>,
        kind: EntityKind,
    ) -> AppResult<()> {
        if self.entity_exists(path).await {
            return Err(AppError::already_exists(format!(
                "Entity already exists: {}",
                path.display()
            )));
        }
        check_uuid_basename(path, kind)?;

        match kind {
            EntityKind::User | EntityKind::Category => self.create_dir(path).await,
            EntityKind::File => {
                let content = content.ok_or_else(|| {
                    AppError::missing_content(format!(
                        "No content supplied for file: {}",
                        path.display()
                    ))
                })?;
                self.write_file(path, content).await
            }
        }
    }

    async fn entity_exists(&self, path: &Path) -> bool {
        match fs::metadata(path).await {
            Ok(_) => true,
            Err(e) => e.kind() != std::io::ErrorKind::NotFound,
        }
    }

    async fn update_entity(&self, old: &Path, new: &Path) -> AppResult<()> {
        if self.is_non_empty_dir(old).await? {
            return Err(AppError::not_empty(format!(
                "Directory is not empty: {}",
                old.display()
            )));
        }
        if old != new && self.entity_exists(new).await {
            return Err(AppError::already_exists(format!(
                "Rename target already exists: {}",
                new.display()
            )));
        }

        fs::rename(old, new).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {} -> {}", old.display(), new.display()),
                e,
            )
        })?;

        debug!(from = %old.display(), to = %new.display(), "Renamed entity");
        Ok(())
    }

    async fn replace_entity(&self, source: &Path, target: &Path) -> AppResult<()> {
        for path in [source, target] {
            let meta = fs::metadata(path).await.map_err(|e| stat_error(path, e))?;
            if !meta.is_file() {
                return Err(AppError::invalid_path(format!(
                    "Not a regular file: {}",
                    path.display()
                )));
            }
        }

        fs::rename(source, target).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace {} with {}", target.display(), source.display()),
                e,
            )
        })?;

        debug!(from = %source.display(), to = %target.display(), "Replaced file content");
        Ok(())
    }

    async fn delete_entity(&self, path: &Path) -> AppResult<()> {
        let meta = fs::metadata(path).await.map_err(|e| stat_error(path, e))?;

        let removed = if meta.is_dir() {
            if self.is_non_empty_dir(path).await? {
                return Err(AppError::not_empty(format!(
                    "Directory is not empty: {}",
                    path.display()
                )));
            }
            fs::remove_dir(path).await
        } else {
            fs::remove_file(path).await
        };
        removed.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete entity: {}", path.display()),
                e,
            )
        })?;

        debug!(path = %path.display(), "Deleted entity");
        Ok(())
    }

    async fn read_entity(&self, path: &Path) -> AppResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {}", path.display()))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {}", path.display()),
                    e,
                )
            }
        })
    }

    async fn ensure_empty(&self, path: &Path) -> AppResult<()> {
        if self.is_non_empty_dir(path).await? {
            return Err(AppError::not_empty(format!(
                "Directory is not empty: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

/// The basename (minus the extension, for files) must be a UUID.
fn check_uuid_basename(path: &Path, kind: EntityKind) -> AppResult<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AppError::invalid_path(format!("Path has no basename: {}", path.display()))
        })?;

    let stem = match kind {
        EntityKind::File => name.split_once('.').map_or(name, |(stem, _)| stem),
        EntityKind::User | EntityKind::Category => name,
    };

    Uuid::parse_str(stem).map(|_| ()).map_err(|e| {
        AppError::with_source(
            ErrorKind::InvalidPath,
            format!("Basename is not a UUID: {}", path.display()),
            e,
        )
    })
}

fn stat_error(path: &Path, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Entity not found: {}", path.display()))
    } else {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to stat: {}", path.display()),
            e,
        )
    }
}

/// A missing parent surfaces as `ParentMissing`; anything else is `Storage`.
fn open_error(path: &Path, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::with_source(
            ErrorKind::ParentMissing,
            format!("Parent directory does not exist: {}", path.display()),
            e,
        )
    } else {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to create: {}", path.display()),
            e,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filevault_core::types::{CategoryId, FileId, UserId};

    async fn store() -> (tempfile::TempDir, LocalEntityStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalEntityStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_directory_entities() {
        let (_dir, store) = store().await;
        let user = UserId::new();
        let categ = CategoryId::new();

        let user_dir = store.layout().user_dir(user);
        store
            .create_entity(&user_dir, None, EntityKind::User)
            .await
            .unwrap();
        let categ_dir = store.layout().category_dir(user, categ);
        store
            .create_entity(&categ_dir, None, EntityKind::Category)
            .await
            .unwrap();

        assert!(categ_dir.is_dir());
        assert!(store.entity_exists(&categ_dir).await);
    }

    #[tokio::test]
    async fn test_create_refuses_existing_and_non_uuid() {
        let (_dir, store) = store().await;
        let user_dir = store.layout().user_dir(UserId::new());
        store
            .create_entity(&user_dir, None, EntityKind::User)
            .await
            .unwrap();

        let err = store
            .create_entity(&user_dir, None, EntityKind::User)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);

        let bad = store.layout().root().join("alice");
        let err = store
            .create_entity(&bad, None, EntityKind::User)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
        assert!(!bad.exists());
    }

    #[tokio::test]
    async fn test_file_requires_content_and_round_trips() {
        let (_dir, store) = store().await;
        let (u, c, f) = (UserId::new(), CategoryId::new(), FileId::new());
        let layout = store.layout().clone();
        std::fs::create_dir_all(layout.category_dir(u, c)).unwrap();

        let path = layout.file_path(u, c, f, ".txt");
        let err = store
            .create_entity(&path, None, EntityKind::File)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingContent);

        store
            .create_entity(&path, Some(b"Hello World"), EntityKind::File)
            .await
            .unwrap();
        assert_eq!(store.read_entity(&path).await.unwrap(), b"Hello World");
    }

    #[tokio::test]
    async fn test_create_file_without_parent() {
        let (_dir, store) = store().await;
        let path = store
            .layout()
            .file_path(UserId::new(), CategoryId::new(), FileId::new(), ".bin");
        let err = store
            .create_entity(&path, Some(b"x"), EntityKind::File)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParentMissing);
    }

    #[tokio::test]
    async fn test_update_and_delete_refuse_non_empty_directory() {
        let (_dir, store) = store().await;
        let (u, c, f) = (UserId::new(), CategoryId::new(), FileId::new());
        let layout = store.layout().clone();
        let categ_dir = layout.category_dir(u, c);
        std::fs::create_dir_all(&categ_dir).unwrap();
        std::fs::write(layout.file_path(u, c, f, ".txt"), b"x").unwrap();

        let target = layout.category_dir(UserId::new(), c);
        let err = store.update_entity(&categ_dir, &target).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotEmpty);

        let err = store.delete_entity(&categ_dir).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotEmpty);
        assert!(categ_dir.exists());

        let err = store.ensure_empty(&layout.user_dir(u)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotEmpty);
    }

    #[tokio::test]
    async fn test_rename_file_across_categories() {
        let (_dir, store) = store().await;
        let (u, c1, c2, f) = (UserId::new(), CategoryId::new(), CategoryId::new(), FileId::new());
        let layout = store.layout().clone();
        std::fs::create_dir_all(layout.category_dir(u, c1)).unwrap();
        std::fs::create_dir_all(layout.category_dir(u, c2)).unwrap();

        let old = layout.file_path(u, c1, f, ".txt");
        let new = layout.file_path(u, c2, f, ".csv");
        std::fs::write(&old, b"a,b").unwrap();

        store.update_entity(&old, &new).await.unwrap();
        assert!(!store.entity_exists(&old).await);
        assert_eq!(std::fs::read(&new).unwrap(), b"a,b");
    }

    #[tokio::test]
    async fn test_replace_swaps_file_content() {
        let (_dir, store) = store().await;
        let (u, c) = (UserId::new(), CategoryId::new());
        let layout = store.layout().clone();
        std::fs::create_dir_all(layout.category_dir(u, c)).unwrap();

        let target = layout.file_path(u, c, FileId::new(), ".txt");
        let staging = layout.staging_path(u, c, ".txt");
        std::fs::write(&target, b"old").unwrap();
        std::fs::write(&staging, b"new").unwrap();

        store.replace_entity(&staging, &target).await.unwrap();
        assert!(!store.entity_exists(&staging).await);
        assert_eq!(std::fs::read(&target).unwrap(), b"new");

        // Directories are never replaced.
        let err = store
            .replace_entity(&target, &layout.category_dir(u, c))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_delete_single_entities() {
        let (_dir, store) = store().await;
        let (u, c, f) = (UserId::new(), CategoryId::new(), FileId::new());
        let layout = store.layout().clone();
        std::fs::create_dir_all(layout.category_dir(u, c)).unwrap();
        let file = layout.file_path(u, c, f, "");
        std::fs::write(&file, b"payload").unwrap();

        store.delete_entity(&file).await.unwrap();
        store.delete_entity(&layout.category_dir(u, c)).await.unwrap();
        store.delete_entity(&layout.user_dir(u)).await.unwrap();
        assert!(!store.entity_exists(&layout.user_dir(u)).await);
    }
}
