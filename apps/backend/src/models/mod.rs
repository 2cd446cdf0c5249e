//! Record drafts and API types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from quiz-core
pub use quiz_core::{
    GeneratedQuestion, Note, QuestionReview, Quiz, QuizAttempt, QuizQuestion, Score,
    SessionState,
};

// === Record Drafts ===
// Inserted into the record store; the store assigns id and timestamps.

#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuiz {
    pub note_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuizQuestion {
    pub quiz_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub order: usize,
}

impl NewQuizQuestion {
    pub fn from_generated(quiz_id: Uuid, order: usize, generated: &GeneratedQuestion) -> Self {
        Self {
            quiz_id,
            question: generated.question.clone(),
            options: generated.options.to_vec(),
            correct_answer: generated.correct_answer,
            order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAttempt {
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: usize,
    pub total_questions: usize,
    pub answers: BTreeMap<usize, usize>,
}

/// Fields a note update overwrites.
#[derive(Debug, Clone, Serialize)]
pub struct NotePatch {
    pub title: String,
    pub content: String,
    pub subject: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// === API Request/Response Types ===

/// Create or update note request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListResponse {
    pub notes: Vec<Note>,
}

/// Generate quiz request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateQuizRequest {
    pub num_questions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizListResponse {
    pub quizzes: Vec<Quiz>,
}

/// Quiz with its ordered questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetailResponse {
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptListResponse {
    pub attempts: Vec<QuizAttempt>,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: Uuid,
}

/// Select answer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub option: usize,
}

/// Question as shown while a session is running; the correct answer stays hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub position: usize,
    pub question: String,
    pub options: Vec<String>,
}

/// Session state as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub quiz_id: Uuid,
    pub quiz_title: String,
    pub total_questions: usize,
    #[serde(flatten)]
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Vec<QuestionReview>>,
    /// Set once the completed session has been saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<Uuid>,
}
