//! # filevault-service
//!
//! Use cases for FileVault. The [`Coordinator`] keeps the database and the
//! entity tree in step, the [`Context`] holds the live configuration
//! snapshot, and the [`watcher`] swaps that snapshot when the configuration
//! file changes.
//!
//! Every operation reads one snapshot at its start and uses it throughout.

pub mod context;
pub mod coordinator;
pub mod session;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{Context, Snapshot};
pub use coordinator::{
    CategoryChanges, Coordinator, FileChanges, NewCategory, NewFile, NewUser, UserChanges,
};
pub use session::SessionService;
pub use watcher::{ConfigWatcher, RestartSignal};
