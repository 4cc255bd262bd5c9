//! # filevault-storage
//!
//! Filesystem engine for FileVault. Implements
//! [`filevault_core::traits::EntityStore`] over a local directory tree whose
//! entries are all UUID-named.

pub mod providers;

pub use providers::local::LocalEntityStore;
