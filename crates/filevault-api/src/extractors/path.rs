//! Typed path parameters for the nested routes.
//!
//! Segments arrive as strings so that a malformed id yields the entity's own
//! "invalid id" message instead of the generic path rejection.

use std::str::FromStr;

use serde::Deserialize;

use filevault_core::error::AppError;
use filevault_core::types::{CategoryId, FileId, UserId};

use crate::error::ApiError;
use crate::messages::{self, EntityMessages};

/// Parses an id from a path segment or body field.
pub fn parse_id<I>(raw: &str, entity: &EntityMessages) -> Result<I, ApiError>
where
    I: FromStr<Err = uuid::Error>,
{
    raw.parse().map_err(|e| {
        ApiError::from(AppError::bad_request(format!("Invalid UUID '{raw}': {e}")))
            .with_message(entity.invalid_id)
    })
}

/// `/user/{userId}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPath {
    pub user_id: String,
}

impl UserPath {
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        parse_id(&self.user_id, &messages::USER)
    }
}

/// `/user/{userId}/category/{categId}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPath {
    pub user_id: String,
    pub categ_id: String,
}

impl CategoryPath {
    pub fn ids(&self) -> Result<(UserId, CategoryId), ApiError> {
        Ok((
            parse_id(&self.user_id, &messages::USER)?,
            parse_id(&self.categ_id, &messages::CATEGORY)?,
        ))
    }
}

/// `/user/{userId}/category/{categId}/file/{fileId}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePath {
    pub user_id: String,
    pub categ_id: String,
    pub file_id: String,
}

impl FilePath {
    pub fn ids(&self) -> Result<(UserId, CategoryId, FileId), ApiError> {
        Ok((
            parse_id(&self.user_id, &messages::USER)?,
            parse_id(&self.categ_id, &messages::CATEGORY)?,
            parse_id(&self.file_id, &messages::FILE)?,
        ))
    }
}
