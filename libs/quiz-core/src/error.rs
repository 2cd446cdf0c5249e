//! Error types for quiz-core.

use thiserror::Error;

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by the quiz session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("question {position} marks option {correct_answer} as correct but has {count} options")]
    MalformedQuestion {
        position: usize,
        correct_answer: usize,
        count: usize,
    },

    #[error("an answer is required for question {position} before advancing")]
    AnswerRequired { position: usize },

    #[error("option {index} is out of range for question {position} ({count} options)")]
    OptionOutOfRange {
        position: usize,
        index: usize,
        count: usize,
    },

    #[error("session is already completed")]
    AlreadyCompleted,

    #[error("session is not completed yet")]
    NotCompleted,
}

/// Errors raised when validating a requested question count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    #[error("question count {requested} is outside {min}..={max}")]
    OutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
}
