//! Quiz session endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AnswerRequest, SessionView};
use crate::routes::auth::AuthenticatedUser;
use crate::services::sessions::{record_completion, Advanced};
use crate::AppState;

/// GET /api/sessions/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    let view = state.sessions.view(auth.user_id, session_id).await?;
    Ok(Json(view))
}

/// PUT /api/sessions/:id/answer
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<SessionView>> {
    let view = state
        .sessions
        .select_answer(auth.user_id, session_id, payload.option)
        .await?;
    Ok(Json(view))
}

/// POST /api/sessions/:id/advance
/// Moves to the next question; completing the quiz records an attempt.
/// Results are returned even when the attempt cannot be saved.
pub async fn advance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    match state.sessions.advance(auth.user_id, session_id).await? {
        Advanced::Next(view) => Ok(Json(view)),
        Advanced::Completed(active) => Ok(Json(
            record_completion(&state.db, session_id, &active).await,
        )),
    }
}
