//! # filevault-core
//!
//! Core crate for FileVault. Contains the configuration schema and loader,
//! typed identifiers, the User/Category/File models, the entity store trait,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other FileVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
