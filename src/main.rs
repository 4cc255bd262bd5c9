//! FileVault Server: multi-tenant file repository.
//!
//! Main entry point that wires all crates together, watches the
//! configuration file and serves the HTTP API until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use filevault_api::run_server;
use filevault_core::config::{AppConfig, LogFormat};
use filevault_core::error::AppError;
use filevault_service::{ConfigWatcher, Context, Snapshot};
use filevault_storage::LocalEntityStore;

#[tokio::main]
async fn main() {
    let config_path = config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, config_path).await {
        error!(kind = %e.kind, error = %e, "Server error");
        std::process::exit(1);
    }
}

/// `FILEVAULT_CONFIG`, or `config.json` in the working directory.
fn config_path() -> PathBuf {
    std::env::var("FILEVAULT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"))
}

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig, config_path: PathBuf) -> Result<(), AppError> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting FileVault"
    );

    // ── Step 1: Entity root ──────────────────────────────────────
    let store = LocalEntityStore::new(&config.root).await?;
    info!(root = %config.root, "Entity root ready");

    // ── Step 2: Database connection + schema check ───────────────
    let snapshot = Snapshot::open(config).await?;
    let context = Context::new(snapshot, Arc::new(store));

    // ── Step 3: Shutdown channel & config watcher ────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (restart_tx, restart_rx) = mpsc::channel(4);

    let watcher = ConfigWatcher::new(config_path, context.clone(), restart_tx).await;
    let watcher_handle = tokio::spawn(watcher.run(shutdown_rx.clone()));

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // ── Step 4: Serve until shutdown ─────────────────────────────
    let served = run_server(context.clone(), restart_rx, shutdown_rx).await;
    if served.is_err() {
        watcher_handle.abort();
    }

    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
    context.snapshot().db.close().await;

    served?;
    info!("FileVault server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
