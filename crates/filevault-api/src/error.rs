//! Maps domain `AppError` to HTTP responses.
//!
//! Every error body is `{message, error}`: `message` is the user-facing
//! text, `error` the error kind and technical detail from the failing layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use filevault_core::error::{AppError, ErrorKind};

use crate::messages::{self, EntityMessages};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// Error kind and technical detail, e.g. `NOT_EMPTY: ...`.
    pub error: String,
}

/// An [`AppError`] on its way out of a handler, optionally carrying a more
/// specific message than the one derived from its kind.
#[derive(Debug)]
pub struct ApiError {
    source: AppError,
    message: Option<&'static str>,
}

impl ApiError {
    /// Replace the default message.
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// Attach the entity-specific "not found" message when `source` is a
    /// by-id miss.
    pub fn entity(source: AppError, entity: &EntityMessages) -> Self {
        let not_found = source.is(ErrorKind::NotFound);
        let error = Self::from(source);
        if not_found {
            error.with_message(entity.not_found)
        } else {
            error
        }
    }

    /// The underlying domain error.
    pub fn source(&self) -> &AppError {
        &self.source
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.source.kind)
    }
}

impl From<AppError> for ApiError {
    fn from(source: AppError) -> Self {
        Self {
            source,
            message: None,
        }
    }
}

/// HTTP status for each error kind. Only client-attributable kinds get a 4xx.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateUser => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::BadRequest => messages::BAD_REQUEST,
        ErrorKind::Unauthenticated => messages::UNAUTHENTICATED,
        ErrorKind::NotFound => messages::NOT_FOUND,
        ErrorKind::DuplicateUser => messages::DUPLICATE_USER,
        _ => messages::INTERNAL,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                kind = %self.source.kind,
                error = %self.source,
                "Internal server error"
            );
        }

        let body = ApiErrorResponse {
            message: self
                .message
                .unwrap_or_else(|| default_message(self.source.kind))
                .to_string(),
            error: self.source.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::DuplicateUser), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::NotEmpty), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_for(ErrorKind::ParentMissing),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(ErrorKind::IntegrityViolation),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_entity_message_only_for_not_found() {
        let miss = ApiError::entity(AppError::not_found("no row"), &messages::CATEGORY);
        assert_eq!(miss.message, Some(messages::CATEGORY.not_found));

        let other = ApiError::entity(AppError::not_empty("busy"), &messages::CATEGORY);
        assert_eq!(other.message, None);
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
