//! Note endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use quiz_core::QuestionCount;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::quiz::generate_quiz;
use crate::AppState;

fn validate(req: &NoteRequest) -> Result<()> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be blank".to_string()));
    }
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be blank".to_string()));
    }
    Ok(())
}

/// GET /api/notes
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<NoteListResponse>> {
    let notes = state.db.list_notes(auth.user_id).await?;
    Ok(Json(NoteListResponse { notes }))
}

/// POST /api/notes
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<NoteRequest>,
) -> Result<(StatusCode, Json<Note>)> {
    validate(&payload)?;
    let note = state.db.create_note(auth.user_id, &payload).await?;

    tracing::info!(note_id = %note.id, "Created note");
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Note>> {
    let note = state.db.get_note(auth.user_id, note_id).await?;
    Ok(Json(note))
}

/// PUT /api/notes/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<Note>> {
    validate(&payload)?;
    let note = state.db.update_note(auth.user_id, note_id, &payload).await?;
    Ok(Json(note))
}

/// DELETE /api/notes/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.db.delete_note(auth.user_id, note_id).await?;

    tracing::info!(%note_id, "Deleted note");
    Ok(StatusCode::NO_CONTENT)
}

/// Question count requested in `body`; an empty body or absent field means `default`.
fn requested_count(body: &[u8], default: QuestionCount) -> Result<QuestionCount> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(default);
    }

    let Json(request) = Json::<GenerateQuizRequest>::from_bytes(body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    match request.num_questions {
        Some(n) => Ok(QuestionCount::new(n)?),
        None => Ok(default),
    }
}

/// POST /api/notes/:id/quizzes
/// Generates a quiz from the note's content
pub async fn generate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(note_id): Path<Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<QuizDetailResponse>)> {
    let count = requested_count(&body, state.config.default_question_count)?;

    let detail = generate_quiz(&state.db, auth.user_id, note_id, count).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}
