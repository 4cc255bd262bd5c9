//! Integration tests for category operations.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_category_lifecycle() {
    let app = TestApp::new().await;
    let user = app.create_user("erin").await;

    let categ = app.create_category(&user, "invoices").await;
    let dir = app.root().join(&user).join(&categ);
    assert!(dir.is_dir());

    let list = app.call("GET", &format!("/user/{user}/category"), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body[0]["id"], categ.as_str());
    assert_eq!(list.body[0]["userId"], user.as_str());

    let path = format!("/user/{user}/category/{categ}");
    let renamed = app.call("PATCH", &path, Some(json!({ "name": "bills" }))).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["message"], "Categoria atualizada com sucesso.");
    assert_eq!(app.call("GET", &path, None).await.body["name"], "bills");

    let deleted = app.call("DELETE", &path, None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!dir.exists());
    assert_eq!(app.call("GET", &path, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_category_refuses_non_empty() {
    let app = TestApp::new().await;
    let a = app.create_user("user-a").await;
    let b = app.create_user("user-b").await;
    let c = app.create_category(&a, "C").await;
    let f = app.create_file(&a, &c, "report", "SGVsbG8=").await;

    let path = format!("/user/{a}/category/{c}");
    let refused = app
        .call("PATCH", &path, Some(json!({ "userId": b, "name": "C" })))
        .await;
    assert_eq!(refused.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(refused.body["error"].as_str().unwrap().starts_with("NOT_EMPTY"));
    assert!(app.root().join(&a).join(&c).is_dir());
    assert_eq!(app.call("GET", &path, None).await.body["userId"], a.as_str());

    let removed = app
        .call("DELETE", &format!("/user/{a}/category/{c}/file/{f}"), None)
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let moved = app
        .call("PATCH", &path, Some(json!({ "userId": b, "name": "C" })))
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert!(!app.root().join(&a).join(&c).exists());
    assert!(app.root().join(&b).join(&c).is_dir());

    let under_b = app.call("GET", &format!("/user/{b}/category/{c}"), None).await;
    assert_eq!(under_b.status, StatusCode::OK);
    assert_eq!(under_b.body["userId"], b.as_str());
}

#[tokio::test]
async fn test_category_of_another_user_is_not_found() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner").await;
    let other = app.create_user("other").await;
    let categ = app.create_category(&owner, "private").await;

    let response = app
        .call("GET", &format!("/user/{other}/category/{categ}"), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Categoria não encontrada.");
}

#[tokio::test]
async fn test_move_to_missing_user_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_user("frank").await;
    let categ = app.create_category(&user, "misc").await;

    let response = app
        .call(
            "PATCH",
            &format!("/user/{user}/category/{categ}"),
            Some(json!({ "userId": "6f1c2a2e-6c43-4c4e-9d55-1f1a9e3b8a10" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.root().join(&user).join(&categ).is_dir());
}
