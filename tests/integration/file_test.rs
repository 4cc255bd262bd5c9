//! Integration tests for file operations.

use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_upload_and_download() {
    let app = TestApp::new().await;
    let user = app.create_user("alice").await;
    let categ = app.create_category(&user, "reports").await;

    let created = app
        .call(
            "POST",
            &format!("/user/{user}/category/{categ}/file"),
            Some(json!({
                "name": "report",
                "extension": ".txt",
                "mimetype": "text/plain",
                "content": "SGVsbG8gV29ybGQ=",
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["message"], "Arquivo criado com sucesso.");
    let file = created.id();

    let download = app
        .call(
            "GET",
            &format!("/user/{user}/category/{categ}/file/{file}/download"),
            None,
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.bytes, b"Hello World");
    assert_eq!(download.header("content-type"), Some("text/plain"));
    assert_eq!(
        download.header("content-disposition"),
        Some("attachment; filename=\"report\"")
    );

    let meta = app
        .call("GET", &format!("/user/{user}/category/{categ}/file/{file}"), None)
        .await;
    assert_eq!(meta.body["categId"], categ.as_str());
    assert_eq!(meta.body["extension"], ".txt");
    assert_eq!(meta.body["mimetype"], "text/plain");
}

#[tokio::test]
async fn test_rename_with_new_content() {
    let app = TestApp::new().await;
    let user = app.create_user("bob").await;
    let categ = app.create_category(&user, "data").await;
    let file = app.create_file(&user, &categ, "report", "SGVsbG8=").await;
    let dir = app.root().join(&user).join(&categ);

    let response = app
        .call(
            "PATCH",
            &format!("/user/{user}/category/{categ}/file/{file}"),
            Some(json!({
                "categId": categ,
                "name": "r2",
                "extension": ".csv",
                "mimetype": "text/csv",
                "content": STANDARD.encode("a,b"),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Arquivo atualizado com sucesso.");

    assert!(!dir.join(format!("{file}.txt")).exists());
    assert_eq!(std::fs::read(dir.join(format!("{file}.csv"))).unwrap(), b"a,b");

    // Nothing left behind besides the payload itself.
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_replace_content_in_place() {
    let app = TestApp::new().await;
    let user = app.create_user("carol").await;
    let categ = app.create_category(&user, "notes").await;
    let file = app.create_file(&user, &categ, "todo", "b2xk").await;
    let dir = app.root().join(&user).join(&categ);

    let response = app
        .call(
            "PATCH",
            &format!("/user/{user}/category/{categ}/file/{file}"),
            Some(json!({ "content": STANDARD.encode("new") })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(std::fs::read(dir.join(format!("{file}.txt"))).unwrap(), b"new");
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_move_file_between_categories() {
    let app = TestApp::new().await;
    let user = app.create_user("dave").await;
    let from = app.create_category(&user, "inbox").await;
    let to = app.create_category(&user, "archive").await;
    let file = app.create_file(&user, &from, "memo", "bWVtbw==").await;

    let response = app
        .call(
            "PATCH",
            &format!("/user/{user}/category/{from}/file/{file}"),
            Some(json!({ "categId": to })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let root = app.root().join(&user);
    assert!(!root.join(&from).join(format!("{file}.txt")).exists());
    assert_eq!(
        std::fs::read(root.join(&to).join(format!("{file}.txt"))).unwrap(),
        b"memo"
    );

    let old_path = app
        .call("GET", &format!("/user/{user}/category/{from}/file/{file}"), None)
        .await;
    assert_eq!(old_path.status, StatusCode::NOT_FOUND);
    let new_path = app
        .call("GET", &format!("/user/{user}/category/{to}/file/{file}"), None)
        .await;
    assert_eq!(new_path.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_category_with_files_fails() {
    let app = TestApp::new().await;
    let user = app.create_user("erin").await;
    let categ = app.create_category(&user, "busy").await;
    let file = app.create_file(&user, &categ, "keep", "a2VlcA==").await;

    let response = app
        .call("DELETE", &format!("/user/{user}/category/{categ}"), None)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let still_there = app
        .call("GET", &format!("/user/{user}/category/{categ}/file/{file}"), None)
        .await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_base64_is_bad_request() {
    let app = TestApp::new().await;
    let user = app.create_user("frank").await;
    let categ = app.create_category(&user, "misc").await;

    let response = app
        .call(
            "POST",
            &format!("/user/{user}/category/{categ}/file"),
            Some(json!({
                "name": "broken",
                "extension": ".bin",
                "mimetype": "application/octet-stream",
                "content": "%%%",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        std::fs::read_dir(app.root().join(&user).join(&categ))
            .unwrap()
            .count(),
        0
    );
}

#[tokio::test]
async fn test_file_under_wrong_category_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_user("gina").await;
    let a = app.create_category(&user, "a").await;
    let b = app.create_category(&user, "b").await;
    let file = app.create_file(&user, &a, "doc", "ZG9j").await;

    let response = app
        .call(
            "GET",
            &format!("/user/{user}/category/{b}/file/{file}/download"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Arquivo não encontrado.");
}
