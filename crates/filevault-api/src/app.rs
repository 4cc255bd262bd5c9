//! Application builder: wires router, middleware and state into an Axum app,
//! and serves it until shutdown.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_service::{Context, RestartSignal};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::middleware::preflight::answer_options;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// CORS origins and the body limit are read from the snapshot current at
/// build time; the server is rebuilt when a restart is signalled.
pub fn build_app(state: AppState) -> Router {
    let snapshot = state.context.snapshot();
    let config = &snapshot.config;

    build_router(state.clone())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(build_compression_layer())
        .layer(axum_middleware::from_fn(answer_options))
        .layer(build_cors_layer(&config.origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}

/// Serves the API until `shutdown` fires.
///
/// A [`RestartSignal`] stops the current listener gracefully and binds a new
/// one from the then-current snapshot, so port and environment changes take
/// effect without restarting the process.
pub async fn run_server(
    context: Context,
    mut restart: mpsc::Receiver<RestartSignal>,
    mut shutdown: watch::Receiver<bool>,
) -> AppResult<()> {
    loop {
        // ── Step 1: Bind the listener for the current snapshot ──────
        let snapshot = context.snapshot();
        let addr = SocketAddr::from(([0, 0, 0, 0], snapshot.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        info!(
            %addr,
            environment = %snapshot.config.environment,
            "FileVault server listening"
        );
        drop(snapshot);

        // ── Step 2: Serve until restart or shutdown ──────────────────
        let app = build_app(AppState::new(context.clone()));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = stop_rx.await;
                })
                .await
        });

        let next = tokio::select! {
            result = &mut server => {
                let served = result
                    .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?;
                served.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
                warn!("Server stopped without a shutdown request");
                return Ok(());
            }
            _ = shutdown.changed() => None,
            signal = restart.recv() => signal,
        };

        // ── Step 3: Drain in-flight requests ─────────────────────────
        let _ = stop_tx.send(());
        server
            .await
            .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        match next {
            Some(signal) => {
                let root = context.store().layout().root();
                if root != std::path::Path::new(&signal.root) {
                    warn!(
                        current = %root.display(),
                        configured = %signal.root,
                        "Entity root is bound at startup; restart the process to apply the new root"
                    );
                }
                info!(
                    port = signal.port,
                    environment = %signal.environment,
                    "Restarting HTTP server for new configuration"
                );
            }
            None => {
                info!("HTTP server stopped");
                return Ok(());
            }
        }
    }
}
