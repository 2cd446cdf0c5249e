//! Quiz endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/quizzes
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<QuizListResponse>> {
    let quizzes = state.db.list_quizzes(auth.user_id).await?;
    Ok(Json(QuizListResponse { quizzes }))
}

/// GET /api/quizzes/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizDetailResponse>> {
    let quiz = state.db.get_quiz(auth.user_id, quiz_id).await?;
    let questions = state.db.get_questions(quiz.id).await?;
    Ok(Json(QuizDetailResponse { quiz, questions }))
}

/// GET /api/quizzes/:id/attempts
pub async fn attempts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<AttemptListResponse>> {
    let quiz = state.db.get_quiz(auth.user_id, quiz_id).await?;
    let attempts = state.db.list_attempts(auth.user_id, quiz.id).await?;
    Ok(Json(AttemptListResponse { attempts }))
}

/// POST /api/quizzes/:id/sessions
/// Starts taking a quiz
pub async fn start_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let quiz = state.db.get_quiz(auth.user_id, quiz_id).await?;
    let questions = state.db.get_questions(quiz.id).await?;

    let view = state.sessions.start(auth.user_id, quiz, questions).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
