//! Configuration file watcher.
//!
//! Polls the configuration file on an interval and hashes its content. A
//! changed hash triggers a reload: parse, open the database, check the
//! schema, then swap the live snapshot. Any failure keeps the old snapshot.
//! Changes the running server cannot absorb are reported on the restart
//! channel.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use filevault_core::config::{AppConfig, Environment};
use filevault_core::result::AppResult;

use crate::context::{Context, Snapshot};

/// Sent when a reloaded configuration needs the HTTP server rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartSignal {
    pub port: u16,
    pub environment: Environment,
    pub root: String,
}

/// Result of one poll of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Unchanged,
    Reloaded { restart: bool },
    Failed,
}

/// Watches one configuration file and keeps the [`Context`] in sync with it.
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    context: Context,
    restart: mpsc::Sender<RestartSignal>,
    last_hash: Option<Vec<u8>>,
}

impl ConfigWatcher {
    /// Create a watcher. The file's current content counts as already loaded.
    pub async fn new(
        path: impl Into<PathBuf>,
        context: Context,
        restart: mpsc::Sender<RestartSignal>,
    ) -> Self {
        let path = path.into();
        let last_hash = tokio::fs::read(&path).await.ok().map(|bytes| digest(&bytes));
        Self {
            path,
            context,
            restart,
            last_hash,
        }
    }

    /// Poll until `shutdown` turns true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut period = self.context.snapshot().config.watcher.poll_interval();
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            path = %self.path.display(),
            poll_interval_ms = period.as_millis() as u64,
            "Config watcher started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let PollOutcome::Reloaded { .. } = self.poll().await {
                        let next = self.context.snapshot().config.watcher.poll_interval();
                        if next != period {
                            period = next;
                            ticker = time::interval(period);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        }
                    }
                }
            }
        }

        info!("Config watcher stopped");
    }

    async fn poll(&mut self) -> PollOutcome {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read config file");
                return PollOutcome::Failed;
            }
        };

        let hash = digest(&bytes);
        if self.last_hash.as_ref() == Some(&hash) {
            return PollOutcome::Unchanged;
        }
        // Recorded before reloading so broken content is not retried until it changes.
        self.last_hash = Some(hash);

        debug!(path = %self.path.display(), "Config content changed, reloading");
        match self.reload().await {
            Ok(restart) => PollOutcome::Reloaded { restart },
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "Config reload failed; keeping the current configuration"
                );
                PollOutcome::Failed
            }
        }
    }

    /// Returns whether a restart was requested.
    async fn reload(&self) -> AppResult<bool> {
        let next = AppConfig::load(&self.path)?;
        let restart = self.context.snapshot().config.requires_restart(&next);
        let signal = RestartSignal {
            port: next.port,
            environment: next.environment,
            root: next.root.clone(),
        };

        let snapshot = Snapshot::open(next).await?;
        self.context.swap(snapshot);

        if restart {
            info!(
                port = signal.port,
                environment = %signal.environment,
                "Config change requires restart"
            );
            if self.restart.send(signal).await.is_err() {
                warn!("Restart channel closed; restart request dropped");
            }
        }
        Ok(restart)
    }
}

fn digest(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}
