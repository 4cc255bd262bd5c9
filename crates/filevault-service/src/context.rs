//! Live configuration context.
//!
//! A [`Snapshot`] bundles a validated configuration with the database pool
//! and query builder opened from it. The [`Context`] publishes the current
//! snapshot through a `watch` channel; readers clone the `Arc` once at the
//! start of an operation, so a reload never tears an in-flight request.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use filevault_core::config::AppConfig;
use filevault_core::result::AppResult;
use filevault_core::traits::EntityStore;
use filevault_database::repositories::{CategoryRepository, FileRepository, UserRepository};
use filevault_database::{DatabasePool, QueryBuilder};

/// One consistent view of configuration, database and schema.
#[derive(Debug)]
pub struct Snapshot {
    pub config: AppConfig,
    pub db: DatabasePool,
    pub builder: QueryBuilder,
}

impl Snapshot {
    /// Open the database named by `config`, check it answers and that the
    /// configured tables and columns exist.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(&config.database).await?;
        let builder = QueryBuilder::new(config.database.schema.clone(), config.database.driver);

        let checked = async {
            db.health_check().await?;
            db.verify_schema(&builder).await
        }
        .await;
        if let Err(e) = checked {
            db.close().await;
            return Err(e);
        }

        Ok(Self {
            config,
            db,
            builder,
        })
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.db, &self.builder)
    }

    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.db, &self.builder)
    }

    pub fn files(&self) -> FileRepository<'_> {
        FileRepository::new(&self.db, &self.builder)
    }
}

/// Shared handle on the live snapshot and the entity store.
///
/// The store is fixed for the life of the process; a root change is a
/// restart.
#[derive(Debug, Clone)]
pub struct Context {
    live: Arc<watch::Sender<Arc<Snapshot>>>,
    store: Arc<dyn EntityStore>,
}

impl Context {
    pub fn new(snapshot: Snapshot, store: Arc<dyn EntityStore>) -> Self {
        let (live, _) = watch::channel(Arc::new(snapshot));
        Self {
            live: Arc::new(live),
            store,
        }
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.live.borrow().clone()
    }

    /// The entity store.
    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Publish `next` and return the snapshot it replaced.
    ///
    /// The old pool is not closed here; requests still holding it finish
    /// against it and it closes when the last `Arc` drops.
    pub fn swap(&self, next: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(next);
        info!(
            port = next.config.port,
            environment = %next.config.environment,
            "Configuration snapshot swapped"
        );
        self.live.send_replace(next)
    }

    /// Receiver notified on every swap.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.live.subscribe()
    }
}
