//! User CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use filevault_core::types::User;
use filevault_service::{NewUser, UserChanges};

use super::load_user;
use crate::dto::request::{CreateUserRequest, UpdateUserRequest};
use crate::dto::response::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, UserPath, ValidJson};
use crate::messages;
use crate::state::AppState;

/// GET /user
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let snapshot = state.context.snapshot();
    let users = snapshot.users().find_all().await?;
    Ok(Json(users))
}

/// GET /user/{userId}
pub async fn get_user(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> Result<Json<User>, ApiError> {
    let snapshot = state.context.snapshot();
    let user = load_user(&snapshot, path.user_id()?).await?;
    Ok(Json(user))
}

/// POST /user
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let user = state
        .coordinator
        .create_user(NewUser {
            name: req.name,
            password: req.password,
        })
        .await?;

    info!(actor = %auth.id, user_id = %user.id, "User created via API");
    Ok(Json(CreatedResponse::new(user.id, messages::USER.created)))
}

/// PATCH /user/{userId}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<UserPath>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let snapshot = state.context.snapshot();
    let old = load_user(&snapshot, path.user_id()?).await?;

    let changes = UserChanges {
        name: req.name,
        password: req.password,
    };
    let user = state
        .coordinator
        .update_user(&old, changes)
        .await
        .map_err(|e| ApiError::entity(e, &messages::USER))?;

    info!(actor = %auth.id, user_id = %user.id, "User updated via API");
    Ok(Json(MessageResponse::new(messages::USER.updated)))
}

/// DELETE /user/{userId}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<UserPath>,
) -> Result<Json<MessageResponse>, ApiError> {
    let snapshot = state.context.snapshot();
    let user = load_user(&snapshot, path.user_id()?).await?;

    state
        .coordinator
        .delete_user(&user)
        .await
        .map_err(|e| ApiError::entity(e, &messages::USER))?;

    info!(actor = %auth.id, user_id = %user.id, "User deleted via API");
    Ok(Json(MessageResponse::new(messages::USER.deleted)))
}
