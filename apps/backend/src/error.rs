//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quiz_core::{CountError, SessionError};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Invalid question count: {0}")]
    InvalidCount(#[from] CountError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No questions could be generated: {0}")]
    NoQuestions(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::InvalidCount(_) => (StatusCode::BAD_REQUEST, "invalid_count"),
            ApiError::NoQuestions(_) => (StatusCode::UNPROCESSABLE_ENTITY, "no_questions"),
            ApiError::Store(StoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            ApiError::Session(err) => match err {
                SessionError::OptionOutOfRange { .. } => {
                    (StatusCode::BAD_REQUEST, "option_out_of_range")
                }
                SessionError::EmptyQuiz => (StatusCode::UNPROCESSABLE_ENTITY, "empty_quiz"),
                SessionError::MalformedQuestion { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "malformed_question")
                }
                SessionError::AnswerRequired { .. } => (StatusCode::CONFLICT, "answer_required"),
                SessionError::AlreadyCompleted => (StatusCode::CONFLICT, "already_completed"),
                SessionError::NotCompleted => (StatusCode::CONFLICT, "not_completed"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
