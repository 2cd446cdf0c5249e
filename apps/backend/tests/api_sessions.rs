//! Quiz-taking session API tests.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use serde_json::Value;

use common::{auth_header_value, fixtures, TestContext};

/// Create a quiz from the cell note and return its detail JSON.
async fn cell_quiz(ctx: &TestContext, token: &str) -> Value {
    let note = ctx.create_note(token, "Cells", fixtures::CELL_NOTE).await;
    let response = ctx
        .generate_quiz(token, note["id"].as_str().unwrap(), None)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn start(ctx: &TestContext, token: &str, quiz_id: &str) -> Value {
    let response = ctx
        .server
        .post(&format!("/api/quizzes/{}/sessions", quiz_id))
        .add_header(AUTHORIZATION, auth_header_value(token))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn answer(ctx: &TestContext, token: &str, session_id: &str, option: usize) -> axum_test::TestResponse {
    ctx.server
        .put(&format!("/api/sessions/{}/answer", session_id))
        .add_header(AUTHORIZATION, auth_header_value(token))
        .json(&fixtures::answer_request(option))
        .await
}

async fn advance(ctx: &TestContext, token: &str, session_id: &str) -> axum_test::TestResponse {
    ctx.server
        .post(&format!("/api/sessions/{}/advance", session_id))
        .add_header(AUTHORIZATION, auth_header_value(token))
        .await
}

/// Test a new session starts at the first question without revealing answers.
#[tokio::test]
async fn test_start_session() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let quiz = cell_quiz(&ctx, &token).await;

    let session = start(&ctx, &token, quiz["quiz"]["id"].as_str().unwrap()).await;

    assert_eq!(session["status"], "in_progress");
    assert_eq!(session["position"], 0);
    assert_eq!(session["total_questions"], 2);
    assert_eq!(session["quiz_title"], "Cells - Quiz");
    assert_eq!(session["current"]["question"], quiz["questions"][0]["question"]);
    assert!(session["current"].get("correct_answer").is_none());
    assert!(session.get("selected").is_none());
}

/// Test a full run scores correctly and records an attempt.
#[tokio::test]
async fn test_complete_session_records_attempt() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.register().await;
    let quiz = cell_quiz(&ctx, &token).await;
    let quiz_id = quiz["quiz"]["id"].as_str().unwrap();
    let correct: Vec<usize> = quiz["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["correct_answer"].as_u64().unwrap() as usize)
        .collect();

    let session = start(&ctx, &token, quiz_id).await;
    let session_id = session["session_id"].as_str().unwrap();

    // First answer right, second wrong
    let choices = [correct[0], (correct[1] + 1) % 4];

    let response = answer(&ctx, &token, session_id, choices[0]).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["selected"], choices[0]);

    let response = advance(&ctx, &token, session_id).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["position"], 1);

    answer(&ctx, &token, session_id, choices[1]).await.assert_status_ok();
    let response = advance(&ctx, &token, session_id).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["score"]["correct"], 1);
    assert_eq!(body["score"]["total"], 2);
    assert_eq!(body["percent"], 50);
    assert!(body["attempt_id"].is_string());

    let review = body["review"].as_array().unwrap();
    assert_eq!(review.len(), 2);
    assert_eq!(review[0]["is_correct"], true);
    assert_eq!(review[1]["is_correct"], false);
    assert_eq!(review[1]["selected"], choices[1]);

    // Completed sessions leave the registry
    let response = ctx
        .server
        .get(&format!("/api/sessions/{}", session_id))
        .add_header(AUTHORIZATION, auth_header_value(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx
        .server
        .get(&format!("/api/quizzes/{}/attempts", quiz_id))
        .add_header(AUTHORIZATION, auth_header_value(&token))
        .await;
    response.assert_status_ok();
    let attempts: Value = response.json();
    let attempts = attempts["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["id"], body["attempt_id"]);
    assert_eq!(attempts[0]["user_id"], user_id.to_string());
    assert_eq!(attempts[0]["score"], 1);
    assert_eq!(attempts[0]["total_questions"], 2);
    assert_eq!(attempts[0]["answers"]["0"], choices[0]);
    assert_eq!(attempts[0]["answers"]["1"], choices[1]);
}

/// Test advancing without an answer is a conflict.
#[tokio::test]
async fn test_advance_requires_answer() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let quiz = cell_quiz(&ctx, &token).await;
    let session = start(&ctx, &token, quiz["quiz"]["id"].as_str().unwrap()).await;

    let response = advance(&ctx, &token, session["session_id"].as_str().unwrap()).await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "answer_required");
}

/// Test an option index past the last option is rejected.
#[tokio::test]
async fn test_answer_out_of_range() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let quiz = cell_quiz(&ctx, &token).await;
    let session = start(&ctx, &token, quiz["quiz"]["id"].as_str().unwrap()).await;

    let response = answer(&ctx, &token, session["session_id"].as_str().unwrap(), 4).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "option_out_of_range");
}

/// Test changing the answer before advancing keeps the latest choice.
#[tokio::test]
async fn test_answer_can_be_changed() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;
    let quiz = cell_quiz(&ctx, &token).await;
    let session = start(&ctx, &token, quiz["quiz"]["id"].as_str().unwrap()).await;
    let session_id = session["session_id"].as_str().unwrap();

    answer(&ctx, &token, session_id, 0).await.assert_status_ok();
    answer(&ctx, &token, session_id, 3).await.assert_status_ok();

    let response = ctx
        .server
        .get(&format!("/api/sessions/{}", session_id))
        .add_header(AUTHORIZATION, auth_header_value(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["selected"], 3);
    assert_eq!(body["position"], 0);
}

/// Test another user's session is reported as missing.
#[tokio::test]
async fn test_sessions_are_private() {
    let ctx = TestContext::new();
    let (_, owner) = ctx.register().await;
    let (_, stranger) = ctx.register().await;
    let quiz = cell_quiz(&ctx, &owner).await;
    let session = start(&ctx, &owner, quiz["quiz"]["id"].as_str().unwrap()).await;
    let session_id = session["session_id"].as_str().unwrap();

    let response = answer(&ctx, &stranger, session_id, 0).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = advance(&ctx, &stranger, session_id).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

/// Test an unknown session id is not found.
#[tokio::test]
async fn test_unknown_session() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register().await;

    let response = ctx
        .server
        .get(&format!("/api/sessions/{}", uuid::Uuid::new_v4()))
        .add_header(AUTHORIZATION, auth_header_value(&token))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}
