//! Integration tests for configuration hot reload.

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use tokio::sync::{mpsc, watch};

use filevault_auth::JwtDecoder;
use filevault_service::ConfigWatcher;

use crate::helpers::{OPERATOR, OPERATOR_PASSWORD, TestApp, config_json};

async fn wait_for(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_token_lifetime_follows_reloaded_config() {
    let app = TestApp::new().await;
    let (restart_tx, mut restart_rx) = mpsc::channel(4);
    let (stop, shutdown) = watch::channel(false);
    let watcher = ConfigWatcher::new(&app.config_path, app.context.clone(), restart_tx).await;
    let handle = tokio::spawn(watcher.run(shutdown));

    std::fs::write(&app.config_path, config_json(app.dir.path(), 8080, 5)).unwrap();
    let context = app.context.clone();
    wait_for(move || context.snapshot().config.jwt_expires == 5).await;

    let response = app
        .request(
            "POST",
            "/login",
            Some(json!({ "username": OPERATOR, "password": OPERATOR_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let token = response.body["token"].as_str().unwrap();
    let claims = JwtDecoder::new(&app.context.snapshot().config)
        .decode(token)
        .unwrap();
    let remaining = claims.expires_at - Utc::now().timestamp();
    assert!((290..=300).contains(&remaining), "remaining = {remaining}");

    // Same port, no restart needed.
    assert!(restart_rx.try_recv().is_err());

    // Requests keep working against the swapped snapshot.
    let users = app.call("GET", "/user", None).await;
    assert_eq!(users.status, StatusCode::OK);

    stop.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_port_change_requests_restart() {
    let app = TestApp::new().await;
    let (restart_tx, mut restart_rx) = mpsc::channel(4);
    let (stop, shutdown) = watch::channel(false);
    let watcher = ConfigWatcher::new(&app.config_path, app.context.clone(), restart_tx).await;
    let handle = tokio::spawn(watcher.run(shutdown));

    std::fs::write(&app.config_path, config_json(app.dir.path(), 9191, 60)).unwrap();

    let signal = tokio::time::timeout(Duration::from_secs(5), restart_rx.recv())
        .await
        .expect("no restart signal")
        .expect("restart channel closed");
    assert_eq!(signal.port, 9191);
    assert_eq!(app.context.snapshot().config.port, 9191);

    stop.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_broken_config_keeps_serving() {
    let app = TestApp::new().await;
    let (restart_tx, _restart_rx) = mpsc::channel(4);
    let (stop, shutdown) = watch::channel(false);
    let watcher = ConfigWatcher::new(&app.config_path, app.context.clone(), restart_tx).await;
    let handle = tokio::spawn(watcher.run(shutdown));
    let before = app.context.snapshot();

    std::fs::write(&app.config_path, "{ \"port\": ").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(std::sync::Arc::ptr_eq(&before, &app.context.snapshot()));
    let users = app.call("GET", "/user", None).await;
    assert_eq!(users.status, StatusCode::OK);

    stop.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
