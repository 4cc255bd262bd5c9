//! HTTP request handlers.
//!
//! Each handler reads one snapshot of the live context, resolves the path
//! hierarchy through it, and hands mutations to the coordinator.

pub mod auth;
pub mod category;
pub mod file;
pub mod user;

use filevault_core::error::AppError;
use filevault_core::types::{Category, CategoryId, File, FileId, User, UserId};
use filevault_service::Snapshot;

use crate::error::ApiError;
use crate::messages;

pub(crate) async fn load_user(snapshot: &Snapshot, user_id: UserId) -> Result<User, ApiError> {
    snapshot
        .users()
        .find_by_id(user_id)
        .await
        .map_err(|e| ApiError::entity(e, &messages::USER))
}

/// The category `categ_id`, provided it belongs to `user_id`.
pub(crate) async fn load_category(
    snapshot: &Snapshot,
    user_id: UserId,
    categ_id: CategoryId,
) -> Result<Category, ApiError> {
    let category = snapshot
        .categories()
        .find_by_id(categ_id)
        .await
        .map_err(|e| ApiError::entity(e, &messages::CATEGORY))?;

    if category.user_id != user_id {
        let e = AppError::not_found(format!(
            "Category {categ_id} does not belong to user {user_id}"
        ));
        return Err(ApiError::from(e).with_message(messages::CATEGORY.not_found));
    }
    Ok(category)
}

/// The file `file_id`, provided it lives in `category`.
pub(crate) async fn load_file(
    snapshot: &Snapshot,
    category: &Category,
    file_id: FileId,
) -> Result<File, ApiError> {
    let file = snapshot
        .files()
        .find_by_id(file_id)
        .await
        .map_err(|e| ApiError::entity(e, &messages::FILE))?;

    if file.categ_id != category.id {
        let e = AppError::not_found(format!(
            "File {file_id} is not in category {}",
            category.id
        ));
        return Err(ApiError::from(e).with_message(messages::FILE.not_found));
    }
    Ok(file)
}
