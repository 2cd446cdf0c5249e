//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the app over the in-memory record store
//! - Helpers for registering users and creating test data

pub mod fixtures;

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::{TestResponse, TestServer};
use serde_json::Value;
use uuid::Uuid;

use study_notes_backend::config::Config;
use study_notes_backend::db::Database;
use study_notes_backend::{build_router, AppState};

/// Test context owning the app state and a running test server.
pub struct TestContext {
    pub state: AppState,
    pub server: TestServer,
}

impl TestContext {
    /// Create a new test context backed by the in-memory store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(Database::in_memory(), config);
        let server = TestServer::new(build_router(state.clone())).unwrap();
        Self { state, server }
    }

    /// Register a user and return its ID and token.
    pub async fn register(&self) -> (Uuid, String) {
        let response = self.server.post("/api/auth/register").await;
        response.assert_status_ok();
        let body: Value = response.json();

        let user_id = Uuid::parse_str(body["user_id"].as_str().unwrap()).unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (user_id, token)
    }

    /// Create a note as the given user and return its JSON.
    pub async fn create_note(&self, token: &str, title: &str, content: &str) -> Value {
        let response = self
            .server
            .post("/api/notes")
            .add_header(AUTHORIZATION, auth_header_value(token))
            .json(&fixtures::note_request(title, content))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    /// Generate a quiz for a note and return the quiz detail JSON.
    pub async fn generate_quiz(&self, token: &str, note_id: &str, num_questions: Option<usize>) -> TestResponse {
        self.server
            .post(&format!("/api/notes/{}/quizzes", note_id))
            .add_header(AUTHORIZATION, auth_header_value(token))
            .json(&fixtures::generate_request(num_questions))
            .await
    }
}

/// Format authorization header value.
pub fn auth_header_value(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}
