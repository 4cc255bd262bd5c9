//! # filevault-api
//!
//! HTTP API layer for FileVault built on Axum.
//!
//! Provides the REST endpoints for users, categories and files, the bearer
//! token middleware, CORS and request logging, extractors, DTOs and the
//! mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod messages;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
