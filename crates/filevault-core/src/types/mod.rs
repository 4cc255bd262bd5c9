//! Core type definitions used across the FileVault workspace.

pub mod entity;
pub mod id;
pub mod layout;

pub use entity::{Category, EntityKind, File, User, UserCredentials, unix_now};
pub use id::*;
pub use layout::EntityLayout;
