//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filevault_service::{Context, Coordinator, SessionService};

/// Application state containing all shared dependencies.
///
/// Cloned into every handler by Axum; everything inside is reference-counted.
/// Configuration is not held here: handlers read it from the live context.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live snapshot holder and entity store.
    pub context: Context,
    /// Dual-store mutations.
    pub coordinator: Arc<Coordinator>,
    /// Login and token checks.
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(context: Context) -> Self {
        Self {
            coordinator: Arc::new(Coordinator::new(context.clone())),
            sessions: Arc::new(SessionService::new(context.clone())),
            context,
        }
    }
}
