//! Category CRUD handlers, nested under a user.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use filevault_core::types::{Category, UserId};
use filevault_service::{CategoryChanges, NewCategory};

use super::{load_category, load_user};
use crate::dto::request::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::dto::response::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::path::parse_id;
use crate::extractors::{AuthUser, CategoryPath, UserPath, ValidJson};
use crate::messages;
use crate::state::AppState;

/// GET /user/{userId}/category
pub async fn list_categories(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let snapshot = state.context.snapshot();
    let user = load_user(&snapshot, path.user_id()?).await?;
    let categories = snapshot.categories().find_by_user(user.id).await?;
    Ok(Json(categories))
}

/// GET /user/{userId}/category/{categId}
pub async fn get_category(
    State(state): State<AppState>,
    Path(path): Path<CategoryPath>,
) -> Result<Json<Category>, ApiError> {
    let (user_id, categ_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;
    Ok(Json(category))
}

/// POST /user/{userId}/category
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<UserPath>,
    ValidJson(req): ValidJson<CreateCategoryRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let snapshot = state.context.snapshot();
    let user = load_user(&snapshot, path.user_id()?).await?;

    let category = state
        .coordinator
        .create_category(user.id, NewCategory { name: req.name })
        .await?;

    info!(
        actor = %auth.id,
        user_id = %user.id,
        categ_id = %category.id,
        "Category created via API"
    );
    Ok(Json(CreatedResponse::new(
        category.id,
        messages::CATEGORY.created,
    )))
}

/// PATCH /user/{userId}/category/{categId}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<CategoryPath>,
    ValidJson(req): ValidJson<UpdateCategoryRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user_id, categ_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let old = load_category(&snapshot, user_id, categ_id).await?;

    // The target user must exist before anything moves.
    let target = match req.user_id.as_deref() {
        Some(raw) => {
            let target: UserId = parse_id(raw, &messages::USER)?;
            Some(load_user(&snapshot, target).await?.id)
        }
        None => None,
    };

    let changes = CategoryChanges {
        user_id: target,
        name: req.name,
    };
    let category = state
        .coordinator
        .update_category(&old, changes)
        .await
        .map_err(|e| ApiError::entity(e, &messages::CATEGORY))?;

    info!(
        actor = %auth.id,
        categ_id = %category.id,
        user_id = %category.user_id,
        "Category updated via API"
    );
    Ok(Json(MessageResponse::new(messages::CATEGORY.updated)))
}

/// DELETE /user/{userId}/category/{categId}
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<CategoryPath>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user_id, categ_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;

    state
        .coordinator
        .delete_category(&category)
        .await
        .map_err(|e| ApiError::entity(e, &messages::CATEGORY))?;

    info!(actor = %auth.id, categ_id = %category.id, "Category deleted via API");
    Ok(Json(MessageResponse::new(messages::CATEGORY.deleted)))
}
