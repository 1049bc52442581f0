// Shared helpers for in-process router tests. Requests go through
// `tower::ServiceExt::oneshot`, so no listener or database is involved.

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use users_api::database::DatabaseError;
use users_api::handlers::{router, AppState};
use users_api::services::users::UserStore;

/// In-memory stand-in for the Postgres-backed store.
pub struct StubStore {
    rows: Vec<Map<String, Value>>,
    fail: bool,
}

impl StubStore {
    pub fn with_rows(rows: Vec<Map<String, Value>>) -> Self {
        Self { rows, fail: false }
    }

    /// Store whose every call fails, for exercising the 500 paths.
    pub fn failing() -> Self {
        Self { rows: Vec::new(), fail: true }
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut.into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for StubStore {
    async fn list_all(&self) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        self.check()?;
        Ok(self.rows.clone())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Map<String, Value>>, DatabaseError> {
        self.check()?;
        Ok(self
            .rows
            .iter()
            .find(|row| row.get("username").and_then(Value::as_str) == Some(username))
            .cloned())
    }
}

/// A typical users row, in the shape the column decode produces.
pub fn row(id: i64, username: &str, password: &str) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("id".to_string(), json!(id));
    row.insert("username".to_string(), json!(username));
    row.insert("password".to_string(), json!(password));
    row
}

pub fn app(store: StubStore) -> Router {
    router(AppState::new(store))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.oneshot(request).await.expect("request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, body)
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(app, request).await;
    let value = serde_json::from_slice(&body).expect("json body");
    (status, value)
}

pub async fn post_json(app: Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request");
    let (status, body) = send(app, request).await;
    // Extractor rejections (e.g. 422 on a missing field) carry axum's own
    // plain-text body; callers that assert on the body still see a mismatch.
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

/// POST with full control over the content type, for malformed requests.
pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> StatusCode {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request");
    let (status, _) = send(app, request).await;
    status
}
