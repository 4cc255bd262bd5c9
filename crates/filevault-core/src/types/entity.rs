//! User, Category and File models.
//!
//! These are the shapes returned by the read side. None of them carries the
//! password hash; login uses [`UserCredentials`] exclusively.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, FileId, UserId};

/// The three kinds of entity the repository stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A user; maps to a directory.
    User,
    /// A category; maps to a directory under its user.
    Category,
    /// A file; maps to a regular file under its category.
    File,
}

impl EntityKind {
    /// Whether the entity is represented by a directory.
    pub fn is_directory(self) -> bool {
        !matches!(self, Self::File)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Category => write!(f, "category"),
            Self::File => write!(f, "file"),
        }
    }
}

/// A user as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unix seconds of the last mutation.
    pub updated_at: i64,
}

/// A user row including its password hash. Only the login path sees this.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: UserId,
    pub name: String,
    pub password_hash: String,
}

/// A category owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub updated_at: i64,
}

/// A file's metadata. The payload lives on the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: FileId,
    pub categ_id: CategoryId,
    pub name: String,
    /// Extension including its leading dot, e.g. `.txt`.
    pub extension: String,
    pub mimetype: String,
    pub updated_at: i64,
}

/// Current time as Unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
