//! Registration and authentication API tests.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use uuid::Uuid;

use common::{auth_header_value, TestContext};
use study_notes_backend::config::Config;

/// Test health check needs no token.
#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

/// Test registration returns a usable token.
#[tokio::test]
async fn test_register_and_me() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.register().await;

    let response = ctx
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], user_id.to_string());
}

/// Test protected routes require a token.
#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/notes").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "unauthorized");
}

/// Test an unknown token is rejected.
#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/quizzes")
        .add_header(AUTHORIZATION, auth_header_value("not-a-real-token"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test a header without the Bearer scheme is rejected.
#[tokio::test]
async fn test_non_bearer_header_is_unauthorized() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;

    let response = ctx
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, axum::http::HeaderValue::from_str(&token).unwrap())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test tokens from configuration resolve to their user.
#[tokio::test]
async fn test_configured_token() {
    let user_id = Uuid::new_v4();
    let config = Config {
        auth_tokens: vec![("preset-token".to_string(), user_id)],
        ..Config::default()
    };
    let ctx = TestContext::with_config(config);

    let response = ctx
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, auth_header_value("preset-token"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], user_id.to_string());
}
