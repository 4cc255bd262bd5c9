//! Shared fixtures: a SQLite database and entity root in a temp directory,
//! and an entity store that fails on demand.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::EntityStore;
use filevault_core::types::{EntityKind, EntityLayout};
use filevault_database::migration::run_migrations;
use filevault_database::{DatabasePool, QueryBuilder};
use filevault_storage::LocalEntityStore;

use crate::context::{Context, Snapshot};

pub(crate) struct Harness {
    pub dir: tempfile::TempDir,
    pub config_path: PathBuf,
    pub context: Context,
    pub store: Arc<FaultyStore>,
}

/// A development config rooted in `dir` using the SQLite file `db_file`.
pub(crate) fn config_json(dir: &Path, db_file: &str, port: u16) -> String {
    format!(
        r#"{{
            "environment": "development",
            "port": {port},
            "root": "{root}",
            "database": {{ "driver": "sqlite", "service": "{db}" }},
            "jwt_secret": "test-secret",
            "jwt_expires": 60,
            "password_hash": {{ "memory_kib": 64, "iterations": 1, "parallelism": 1 }},
            "watcher": {{ "poll_interval_ms": 50 }}
        }}"#,
        root = dir.join("root").display(),
        db = dir.join(db_file).display(),
    )
}

/// Create the tables for `config` and open a snapshot on them.
pub(crate) async fn migrated_snapshot(config: AppConfig) -> Snapshot {
    let db = DatabasePool::connect(&config.database).await.unwrap();
    let builder = QueryBuilder::new(config.database.schema.clone(), config.database.driver);
    run_migrations(&db, &builder).await.unwrap();
    Snapshot {
        config,
        db,
        builder,
    }
}

pub(crate) async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, config_json(dir.path(), "vault.db", 8080)).unwrap();

    let config = AppConfig::load(&config_path).unwrap();
    let local = LocalEntityStore::new(&config.root).await.unwrap();
    let store = Arc::new(FaultyStore::new(local));
    let snapshot = migrated_snapshot(config).await;
    let context = Context::new(snapshot, store.clone());

    Harness {
        dir,
        config_path,
        context,
        store,
    }
}

/// A failure injected into [`FaultyStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    None,
    /// `create_entity` fails before touching the tree.
    CreateFails,
    /// `create_entity` writes the entity, then reports failure.
    CreateThenFails,
    /// `create_entity` writes the entity, then hangs for `STALL`.
    CreateThenStalls,
    /// `delete_entity` fails before touching the tree.
    DeleteFails,
    /// `delete_entity` removes the entity, then reports failure.
    DeleteThenFails,
    /// `replace_entity` fails before touching the tree.
    ReplaceFails,
}

/// How long [`Fault::CreateThenStalls`] hangs.
pub(crate) const STALL: Duration = Duration::from_secs(3);

/// Delegates to a [`LocalEntityStore`], failing where a [`Fault`] says so.
#[derive(Debug)]
pub(crate) struct FaultyStore {
    inner: LocalEntityStore,
    fault: Mutex<Fault>,
}

impl FaultyStore {
    fn new(inner: LocalEntityStore) -> Self {
        Self {
            inner,
            fault: Mutex::new(Fault::None),
        }
    }

    pub fn inject(&self, fault: Fault) {
        *self.fault.lock().unwrap() = fault;
    }

    fn fault(&self) -> Fault {
        *self.fault.lock().unwrap()
    }
}

#[async_trait]
impl EntityStore for FaultyStore {
    fn layout(&self) -> &EntityLayout {
        self.inner.layout()
    }

    async fn create_entity(
        &self,
        path: &Path,
        content: Option<&[u8]>,
        kind: EntityKind,
    ) -> AppResult<()> {
        match self.fault() {
            Fault::CreateFails => Err(AppError::storage("injected create failure")),
            Fault::CreateThenFails => {
                self.inner.create_entity(path, content, kind).await?;
                Err(AppError::storage("injected sync failure"))
            }
            Fault::CreateThenStalls => {
                self.inner.create_entity(path, content, kind).await?;
                tokio::time::sleep(STALL).await;
                Ok(())
            }
            _ => self.inner.create_entity(path, content, kind).await,
        }
    }

    async fn entity_exists(&self, path: &Path) -> bool {
        self.inner.entity_exists(path).await
    }

    async fn update_entity(&self, old: &Path, new: &Path) -> AppResult<()> {
        self.inner.update_entity(old, new).await
    }

    async fn replace_entity(&self, source: &Path, target: &Path) -> AppResult<()> {
        if self.fault() == Fault::ReplaceFails {
            return Err(AppError::storage("injected replace failure"));
        }
        self.inner.replace_entity(source, target).await
    }

    async fn delete_entity(&self, path: &Path) -> AppResult<()> {
        match self.fault() {
            Fault::DeleteFails => Err(AppError::storage("injected delete failure")),
            Fault::DeleteThenFails => {
                self.inner.delete_entity(path).await?;
                Err(AppError::storage("injected delete failure"))
            }
            _ => self.inner.delete_entity(path).await,
        }
    }

    async fn read_entity(&self, path: &Path) -> AppResult<Vec<u8>> {
        self.inner.read_entity(path).await
    }

    async fn ensure_empty(&self, path: &Path) -> AppResult<()> {
        self.inner.ensure_empty(path).await
    }
}
