//! Integration tests for login and the bearer token middleware.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{OPERATOR, TestApp};

#[tokio::test]
async fn test_login_returns_token_in_body_and_header() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/login",
            Some(json!({ "username": OPERATOR, "password": "operator-pass" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap();
    assert_eq!(
        response.header("authorization"),
        Some(format!("Bearer {token}").as_str())
    );
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/login",
            Some(json!({ "username": OPERATOR, "password": "nope" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["message"],
        "Acesso negado. Verifique suas credenciais."
    );
}

#[tokio::test]
async fn test_routes_require_token() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/user", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let forged = app.request("GET", "/user", None, Some("not.a.token")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_options_is_always_ok() {
    let app = TestApp::new().await;

    let response = app.request("OPTIONS", "/user/anything", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}
