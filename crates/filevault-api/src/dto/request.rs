//! Request DTOs with validation.
//!
//! Field names are camelCase on the wire. Optional fields on update bodies
//! keep the stored value when absent.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use validator::Validate;

use filevault_core::error::AppError;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create user request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Plain password; the length policy is enforced by the hasher's validator.
    pub password: String,
}

/// Update user request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Create category request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Update category request. A new `userId` moves the category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub user_id: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
}

/// Create file request. `content` is standard base64.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub extension: String,
    #[validate(length(min = 1, message = "Mimetype is required"))]
    pub mimetype: String,
    pub content: String,
}

/// Update file request. A new `categId` moves the file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    pub categ_id: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub extension: Option<String>,
    #[validate(length(min = 1, message = "Mimetype must not be empty"))]
    pub mimetype: Option<String>,
    pub content: Option<String>,
}

/// Decode a base64 `content` field.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, AppError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::bad_request(format!("'content' is not valid base64: {e}")))
}
