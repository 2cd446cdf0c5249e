//! Core quiz library shared by the backend and any future clients.
//!
//! Provides:
//! - Fill-in-the-blank question generation from free-text notes
//! - Quiz-taking session state machine with scoring
//! - Shared record types (Note, Quiz, QuizQuestion, QuizAttempt)

pub mod error;
pub mod generator;
pub mod session;
pub mod types;

pub use error::{CountError, Result, SessionError};
pub use generator::{
    generate_questions, generate_questions_with, QuestionCount, BLANK, OPTION_COUNT,
    QUESTION_PREFIX,
};
pub use session::{score_answers, Progress, QuestionReview, QuizSession, Score, SessionState};
pub use types::{GeneratedQuestion, Note, Quiz, QuizAttempt, QuizQuestion};
