//! Core types for the notes and quiz application.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generator::OPTION_COUNT;

/// A user-authored block of study text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A generated quiz derived from exactly one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub note_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Title given to a quiz generated from the note titled `note_title`.
    pub fn title_for(note_title: &str) -> String {
        format!("{} - Quiz", note_title)
    }
}

/// Question produced by the generator, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: usize,
}

/// Persisted multiple-choice question belonging to a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub order: usize,
}

impl QuizQuestion {
    /// Whether `option` is the correct answer to this question.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

/// Record of one completed run through a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: usize,
    pub total_questions: usize,
    /// Question position -> chosen option index.
    pub answers: BTreeMap<usize, usize>,
    pub completed_at: DateTime<Utc>,
}
