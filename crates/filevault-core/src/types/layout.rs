//! On-disk layout of the entity tree.
//!
//! ```text
//! <root>/<userId>/
//! <root>/<userId>/<categId>/
//! <root>/<userId>/<categId>/<fileId><extension>
//! ```

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::id::{CategoryId, FileId, UserId};
use crate::error::AppError;

/// Computes entity paths under a fixed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLayout {
    root: PathBuf,
}

impl EntityLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<userId>`
    pub fn user_dir(&self, user_id: UserId) -> PathBuf {
        self.root.join(user_id.to_string())
    }

    /// `<root>/<userId>/<categId>`
    pub fn category_dir(&self, user_id: UserId, categ_id: CategoryId) -> PathBuf {
        self.user_dir(user_id).join(categ_id.to_string())
    }

    /// `<root>/<userId>/<categId>/<fileId><extension>`
    pub fn file_path(
        &self,
        user_id: UserId,
        categ_id: CategoryId,
        file_id: FileId,
        extension: &str,
    ) -> PathBuf {
        self.category_dir(user_id, categ_id)
            .join(format!("{file_id}{}", effective_extension(extension)))
    }

    /// A fresh UUID-named sibling inside a category, used to stage payloads.
    pub fn staging_path(&self, user_id: UserId, categ_id: CategoryId, extension: &str) -> PathBuf {
        self.category_dir(user_id, categ_id)
            .join(format!("{}{}", Uuid::new_v4(), effective_extension(extension)))
    }
}

/// The extension as it appears in a path: empty for `""` and `"."`.
pub fn effective_extension(extension: &str) -> &str {
    match extension {
        "" | "." => "",
        ext => ext,
    }
}

/// Normalize a client-supplied extension to the stored form (leading dot).
///
/// Separators are refused so an extension can never escape its category
/// directory.
pub fn normalize_extension(extension: &str) -> Result<String, AppError> {
    let ext = extension.trim();
    if ext.contains(['/', '\\']) || ext.contains("..") {
        return Err(AppError::bad_request(format!(
            "Extension '{extension}' contains path separators"
        )));
    }
    Ok(match ext {
        "" | "." => String::new(),
        e if e.starts_with('.') => e.to_string(),
        e => format!(".{e}"),
    })
}
