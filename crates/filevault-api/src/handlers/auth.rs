//! Login handler.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use filevault_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::LoginResponse;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::messages;
use crate::state::AppState;

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let (token, claims) = state.sessions.login(&req.username, &req.password).await?;

    let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| AppError::internal(format!("Token is not a valid header value: {e}")))?;

    debug!(user_id = %claims.id, expires_at = claims.expires_at, "Issued bearer token");

    let mut response = Json(LoginResponse {
        token,
        message: messages::LOGIN_SUCCEEDED.to_string(),
    })
    .into_response();
    response.headers_mut().insert(AUTHORIZATION, bearer);
    Ok(response)
}
