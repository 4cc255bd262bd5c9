//! Answers every `OPTIONS` request with an empty 200.
//!
//! Real CORS preflights are handled by the CORS layer before reaching this
//! point; anything else using `OPTIONS` still gets a success.

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}
