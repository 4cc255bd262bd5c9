//! File CRUD and download handlers, nested under a category.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use tracing::{debug, info};

use filevault_core::types::{CategoryId, File};
use filevault_service::{FileChanges, NewFile};

use super::{load_category, load_file};
use crate::dto::request::{CreateFileRequest, UpdateFileRequest, decode_content};
use crate::dto::response::{CreatedResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::path::parse_id;
use crate::extractors::{AuthUser, CategoryPath, FilePath, ValidJson};
use crate::messages;
use crate::state::AppState;

/// GET /user/{userId}/category/{categId}/file
pub async fn list_files(
    State(state): State<AppState>,
    Path(path): Path<CategoryPath>,
) -> Result<Json<Vec<File>>, ApiError> {
    let (user_id, categ_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;
    let files = snapshot.files().find_by_category(category.id).await?;
    Ok(Json(files))
}

/// GET /user/{userId}/category/{categId}/file/{fileId}
pub async fn get_file(
    State(state): State<AppState>,
    Path(path): Path<FilePath>,
) -> Result<Json<File>, ApiError> {
    let (user_id, categ_id, file_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;
    let file = load_file(&snapshot, &category, file_id).await?;
    Ok(Json(file))
}

/// POST /user/{userId}/category/{categId}/file
pub async fn create_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<CategoryPath>,
    ValidJson(req): ValidJson<CreateFileRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let (user_id, categ_id) = path.ids()?;
    let content = decode_content(&req.content)?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;

    let input = NewFile {
        name: req.name,
        extension: req.extension,
        mimetype: req.mimetype,
        content,
    };
    let file = state.coordinator.create_file(&category, input).await?;

    info!(actor = %auth.id, categ_id = %category.id, file_id = %file.id, "File created via API");
    Ok(Json(CreatedResponse::new(file.id, messages::FILE.created)))
}

/// PATCH /user/{userId}/category/{categId}/file/{fileId}
pub async fn update_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<FilePath>,
    ValidJson(req): ValidJson<UpdateFileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user_id, categ_id, file_id) = path.ids()?;
    let content = req.content.as_deref().map(decode_content).transpose()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;
    let old = load_file(&snapshot, &category, file_id).await?;

    // The target category must exist before anything moves.
    let target = match req.categ_id.as_deref() {
        Some(raw) => {
            let target: CategoryId = parse_id(raw, &messages::CATEGORY)?;
            snapshot
                .categories()
                .find_by_id(target)
                .await
                .map_err(|e| ApiError::entity(e, &messages::CATEGORY))?;
            Some(target)
        }
        None => None,
    };

    let changes = FileChanges {
        categ_id: target,
        name: req.name,
        extension: req.extension,
        mimetype: req.mimetype,
        content,
    };
    let file = state
        .coordinator
        .update_file(&category, &old, changes)
        .await
        .map_err(|e| ApiError::entity(e, &messages::FILE))?;

    info!(actor = %auth.id, file_id = %file.id, categ_id = %file.categ_id, "File updated via API");
    Ok(Json(MessageResponse::new(messages::FILE.updated)))
}

/// DELETE /user/{userId}/category/{categId}/file/{fileId}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<FilePath>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user_id, categ_id, file_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;
    let file = load_file(&snapshot, &category, file_id).await?;

    state
        .coordinator
        .delete_file(&category, &file)
        .await
        .map_err(|e| ApiError::entity(e, &messages::FILE))?;

    info!(actor = %auth.id, file_id = %file.id, "File deleted via API");
    Ok(Json(MessageResponse::new(messages::FILE.deleted)))
}

/// GET /user/{userId}/category/{categId}/file/{fileId}/download
pub async fn download_file(
    State(state): State<AppState>,
    Path(path): Path<FilePath>,
) -> Result<(HeaderMap, Vec<u8>), ApiError> {
    let (user_id, categ_id, file_id) = path.ids()?;
    let snapshot = state.context.snapshot();
    let category = load_category(&snapshot, user_id, categ_id).await?;
    let file = load_file(&snapshot, &category, file_id).await?;

    let store = state.context.store();
    let payload = store
        .layout()
        .file_path(category.user_id, category.id, file.id, &file.extension);
    let bytes = store.read_entity(&payload).await?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&file.mimetype)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(CONTENT_TYPE, content_type);
    let disposition = format!("attachment; filename=\"{}\"", download_name(&file));
    if let Ok(disposition) = HeaderValue::from_bytes(disposition.as_bytes()) {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }

    debug!(file_id = %file.id, bytes = bytes.len(), "Serving download");
    Ok((headers, bytes))
}

/// The stored name, stripped of characters that would break the quoted
/// header parameter.
fn download_name(file: &File) -> String {
    file.name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect()
}
