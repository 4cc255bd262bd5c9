//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use filevault_api::{AppState, build_app};
use filevault_core::config::AppConfig;
use filevault_database::migration::run_migrations;
use filevault_database::{DatabasePool, QueryBuilder};
use filevault_service::{Context, Coordinator, NewUser, Snapshot};
use filevault_storage::LocalEntityStore;

pub const OPERATOR: &str = "operator";
pub const OPERATOR_PASSWORD: &str = "operator-pass";

/// Test application context
pub struct TestApp {
    /// Holds the database file, the entity root and the config file
    pub dir: tempfile::TempDir,
    /// Path of the config file the app was started from
    pub config_path: PathBuf,
    /// Live context shared with the router
    pub context: Context,
    /// The Axum router for making test requests
    pub router: Router,
    /// Bearer token of the seeded operator account
    pub token: String,
}

/// A development config rooted in `dir`.
pub fn config_json(dir: &Path, port: u16, jwt_expires: i64) -> String {
    json!({
        "environment": "development",
        "origins": ["http://localhost:3000"],
        "port": port,
        "root": dir.join("root"),
        "database": { "driver": "sqlite", "service": dir.join("filevault.db") },
        "jwt_secret": "integration-secret",
        "jwt_expires": jwt_expires,
        "password_hash": { "memory_kib": 64, "iterations": 1, "parallelism": 1 },
        "watcher": { "poll_interval_ms": 50 },
        "logging": { "level": "warn", "format": "pretty" }
    })
    .to_string()
}

impl TestApp {
    /// Create a new test application with an operator account logged in.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, config_json(dir.path(), 8080, 60))
            .expect("Failed to write config");
        let config = AppConfig::load(&config_path).expect("Failed to load test config");

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        let builder = QueryBuilder::new(config.database.schema.clone(), config.database.driver);
        run_migrations(&db, &builder)
            .await
            .expect("Failed to run migrations");
        db.close().await;

        let store = LocalEntityStore::new(&config.root)
            .await
            .expect("Failed to init entity root");
        let snapshot = Snapshot::open(config).await.expect("Failed to open snapshot");
        let context = Context::new(snapshot, Arc::new(store));

        Coordinator::new(context.clone())
            .create_user(NewUser {
                name: OPERATOR.into(),
                password: OPERATOR_PASSWORD.into(),
            })
            .await
            .expect("Failed to seed operator");

        let router = build_app(AppState::new(context.clone()));
        let mut app = Self {
            dir,
            config_path,
            context,
            router,
            token: String::new(),
        };
        app.token = app.login(OPERATOR, OPERATOR_PASSWORD).await;
        app
    }

    /// The entity root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("root")
    }

    /// Log in and return the issued token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("login response has no token")
            .to_string()
    }

    /// Send an authenticated request as the operator.
    pub async fn call(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request(method, path, body, Some(&self.token)).await
    }

    /// Send a request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }

    /// Create a user and return its id.
    pub async fn create_user(&self, name: &str) -> String {
        let response = self
            .call("POST", "/user", Some(json!({ "name": name, "password": "secret-pw" })))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }

    /// Create a category under `user_id` and return its id.
    pub async fn create_category(&self, user_id: &str, name: &str) -> String {
        let response = self
            .call(
                "POST",
                &format!("/user/{user_id}/category"),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }

    /// Create a text file and return its id.
    pub async fn create_file(
        &self,
        user_id: &str,
        categ_id: &str,
        name: &str,
        b64: &str,
    ) -> String {
        let response = self
            .call(
                "POST",
                &format!("/user/{user_id}/category/{categ_id}/file"),
                Some(json!({
                    "name": name,
                    "extension": ".txt",
                    "mimetype": "text/plain",
                    "content": b64,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// The `id` of a create response.
    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response has no id")
            .to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
