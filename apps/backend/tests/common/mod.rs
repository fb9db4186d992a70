//! Common test utilities and fixtures for integration tests.
//!
//! Every context gets its own in-memory SQLite database, so tests need no
//! external services and can run in parallel.

#![allow(dead_code)]

pub mod fixtures;

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestResponse, TestServer};

use skilldrill_backend::db::Database;
use skilldrill_backend::routes::identity::USER_ID_HEADER;
use skilldrill_backend::services::catalog::ContentCatalog;
use skilldrill_backend::{build_router, AppState};

/// Test context containing application state and router.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a new test context with the fixture catalog.
    pub async fn new() -> Self {
        Self::with_catalog(fixtures::catalog()).await
    }

    /// Create a new test context with a custom catalog.
    pub async fn with_catalog(catalog: ContentCatalog) -> Self {
        let db = Database::connect("sqlite::memory:", 1)
            .await
            .expect("Failed to open in-memory database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_state(AppState::new(db, catalog))
    }

    /// Wrap existing state, e.g. a new catalog over an existing database.
    pub fn with_state(state: AppState) -> Self {
        let app = build_router(state.clone(), Duration::from_secs(5));
        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Header name and value identifying `user_id`.
    pub fn user(user_id: &str) -> (HeaderName, HeaderValue) {
        (
            USER_ID_HEADER,
            HeaderValue::from_str(user_id).expect("valid header value"),
        )
    }

    /// Submit an answer as `user_id`.
    pub async fn submit(
        server: &TestServer,
        user_id: &str,
        topic_id: &str,
        item_id: &str,
        answer: &str,
    ) -> TestResponse {
        let (name, value) = Self::user(user_id);
        server
            .post(&format!("/api/topics/{topic_id}/items/{item_id}/answer"))
            .add_header(name, value)
            .json(&fixtures::answer_request(answer))
            .await
    }

    /// Fetch the ring as `user_id` and return `(completed, total)`.
    pub async fn ring(server: &TestServer, user_id: &str, topic_id: &str) -> (u64, u64) {
        let (name, value) = Self::user(user_id);
        let response = server
            .get(&format!("/api/topics/{topic_id}/ring"))
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        (
            body["completed"].as_u64().expect("completed"),
            body["total"].as_u64().expect("total"),
        )
    }
}
