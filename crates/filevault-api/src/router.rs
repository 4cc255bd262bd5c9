//! Route definitions for the FileVault HTTP API.
//!
//! Categories nest under users and files under categories. Every route
//! except `POST /login` sits behind the bearer token middleware.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Build the router with all routes. Cross-cutting layers are added by
/// [`build_app`](crate::app::build_app).
pub fn build_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(user_routes())
        .merge(category_routes())
        .merge(file_routes())
        .route_layer(axum_middleware::from_fn_with_state(state, require_auth));

    Router::new().merge(auth_routes()).merge(protected)
}

/// Login
fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::auth::login))
}

/// Users
fn user_routes() -> Router<AppState> {
    use handlers::user;
    Router::new()
        .route("/user", get(user::list_users).post(user::create_user))
        .route(
            "/user/{userId}",
            get(user::get_user)
                .patch(user::update_user)
                .delete(user::delete_user),
        )
}

/// Categories of a user
fn category_routes() -> Router<AppState> {
    use handlers::category;
    Router::new()
        .route(
            "/user/{userId}/category",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/user/{userId}/category/{categId}",
            get(category::get_category)
                .patch(category::update_category)
                .delete(category::delete_category),
        )
}

/// Files of a category
fn file_routes() -> Router<AppState> {
    use handlers::file;
    Router::new()
        .route(
            "/user/{userId}/category/{categId}/file",
            get(file::list_files).post(file::create_file),
        )
        .route(
            "/user/{userId}/category/{categId}/file/{fileId}",
            get(file::get_file)
                .patch(file::update_file)
                .delete(file::delete_file),
        )
        .route(
            "/user/{userId}/category/{categId}/file/{fileId}/download",
            get(file::download_file),
        )
}
