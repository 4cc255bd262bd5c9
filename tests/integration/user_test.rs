//! Integration tests for user operations.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_read_delete_user() {
    let app = TestApp::new().await;

    let created = app
        .call(
            "POST",
            "/user",
            Some(json!({ "name": "alice", "password": "correct-horse" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert!(created.body["message"].as_str().unwrap().contains("criado"));
    let alice = created.id();
    assert!(app.root().join(&alice).is_dir());

    let list = app.call("GET", "/user", None).await;
    assert_eq!(list.status, StatusCode::OK);
    let users = list.body.as_array().unwrap();
    let entry = users.iter().find(|u| u["name"] == "alice").unwrap();
    assert_eq!(entry["id"], alice.as_str());
    assert!(entry.get("password").is_none());
    assert!(entry["updatedAt"].as_i64().unwrap() > 0);

    let deleted = app.call("DELETE", &format!("/user/{alice}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Usuário excluído com sucesso.");
    assert!(!app.root().join(&alice).exists());

    let gone = app.call("GET", &format!("/user/{alice}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "Usuário não encontrado.");
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = TestApp::new().await;
    let body = json!({ "name": "alice", "password": "correct-horse" });

    let first = app.call("POST", "/user", Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.call("POST", "/user", Some(body)).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert!(second.body["error"].is_string());

    // The operator's directory and alice's; nothing for the rejected attempt.
    let dirs = std::fs::read_dir(app.root()).unwrap().count();
    assert_eq!(dirs, 2);
}

#[tokio::test]
async fn test_short_password_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .call("POST", "/user", Some(json!({ "name": "bob", "password": "abc" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Falha na requisição. Verifique os dados e tente novamente."
    );
}

#[tokio::test]
async fn test_malformed_body_and_id_are_bad_request() {
    let app = TestApp::new().await;

    let missing_field = app.call("POST", "/user", Some(json!({ "name": "bob" }))).await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);

    let bad_id = app.call("GET", "/user/not-a-uuid", None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.body["message"], "Id de usuário inválido.");
}

#[tokio::test]
async fn test_update_user_round_trip() {
    let app = TestApp::new().await;
    let id = app.create_user("carol").await;
    let path = format!("/user/{id}");

    let before = app.call("GET", &path, None).await.body;

    let renamed = app.call("PATCH", &path, Some(json!({ "name": "caroline" }))).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["message"], "Usuário atualizado com sucesso.");
    assert_eq!(app.call("GET", &path, None).await.body["name"], "caroline");

    let restored = app.call("PATCH", &path, Some(json!({ "name": "carol" }))).await;
    assert_eq!(restored.status, StatusCode::OK);

    let after = app.call("GET", &path, None).await.body;
    assert_eq!(after["name"], before["name"]);
    assert!(after["updatedAt"].as_i64() >= before["updatedAt"].as_i64());
}

#[tokio::test]
async fn test_delete_user_with_categories_fails() {
    let app = TestApp::new().await;
    let user = app.create_user("dave").await;
    app.create_category(&user, "docs").await;

    let response = app.call("DELETE", &format!("/user/{user}"), None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.root().join(&user).is_dir());
    assert_eq!(
        app.call("GET", &format!("/user/{user}"), None).await.status,
        StatusCode::OK
    );
}
