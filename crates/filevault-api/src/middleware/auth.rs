//! Bearer token middleware.
//!
//! Layered onto every route except `POST /login`. Verified claims are stored
//! in the request extensions for the [`AuthUser`](crate::extractors::AuthUser)
//! extractor.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;
use crate::extractors::auth::bearer_token;
use crate::state::AppState;

/// Rejects requests without a valid, unexpired bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_token(request.headers()).and_then(|t| state.sessions.authenticate(t));
    let claims = match claims {
        Ok(claims) => claims,
        Err(e) => {
            debug!(path = %request.uri().path(), error = %e, "Rejected unauthenticated request");
            return Err(e.into());
        }
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
