//! Quiz-taking session state machine.
//!
//! A session walks a fixed, ordered list of questions:
//! `InProgress { position }` -> `Completed { score }`.
//! Answers may be changed freely for the current question; advancing requires one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::types::QuizQuestion;

/// Final score of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Rounded percentage of correct answers.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    InProgress { position: usize },
    Completed { score: Score },
}

/// Outcome of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Next { position: usize },
    Completed(Score),
}

/// Per-question outcome shown after completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub position: usize,
    pub question: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
}

/// Count positions whose recorded answer matches the question's correct index.
///
/// Unanswered positions never match.
pub fn score_answers(questions: &[QuizQuestion], answers: &BTreeMap<usize, usize>) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(position, q)| answers.get(position).is_some_and(|&a| q.is_correct(a)))
        .count();

    Score {
        correct,
        total: questions.len(),
    }
}

/// In-memory quiz-taking session over a fixed question list.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    answers: BTreeMap<usize, usize>,
    state: SessionState,
}

impl QuizSession {
    /// Start a session at the first question. Questions are ordered by `order`.
    ///
    /// Every question must have its correct answer among its options.
    pub fn new(mut questions: Vec<QuizQuestion>) -> Result<Self> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }
        questions.sort_by_key(|q| q.order);

        if let Some((position, q)) = questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.correct_answer >= q.options.len())
        {
            return Err(SessionError::MalformedQuestion {
                position,
                correct_answer: q.correct_answer,
                count: q.options.len(),
            });
        }

        Ok(Self {
            questions,
            answers: BTreeMap::new(),
            state: SessionState::InProgress { position: 0 },
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed { .. })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    /// Current position, or `None` once completed.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { position } => Some(position),
            SessionState::Completed { .. } => None,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.position().and_then(|p| self.questions.get(p))
    }

    /// Answer recorded for the current question, if any.
    pub fn selected_answer(&self) -> Option<usize> {
        self.position().and_then(|p| self.answers.get(&p).copied())
    }

    /// Record or overwrite the answer for the current question.
    pub fn select_answer(&mut self, option: usize) -> Result<()> {
        let position = self.position().ok_or(SessionError::AlreadyCompleted)?;
        let count = self.questions[position].options.len();
        if option >= count {
            return Err(SessionError::OptionOutOfRange {
                position,
                index: option,
                count,
            });
        }

        self.answers.insert(position, option);
        Ok(())
    }

    /// Move to the next question, or complete the session from the last one.
    pub fn advance(&mut self) -> Result<Progress> {
        let position = self.position().ok_or(SessionError::AlreadyCompleted)?;
        if !self.answers.contains_key(&position) {
            return Err(SessionError::AnswerRequired { position });
        }

        if position + 1 < self.questions.len() {
            self.state = SessionState::InProgress {
                position: position + 1,
            };
            Ok(Progress::Next {
                position: position + 1,
            })
        } else {
            let score = score_answers(&self.questions, &self.answers);
            self.state = SessionState::Completed { score };
            Ok(Progress::Completed(score))
        }
    }

    /// Final score; only available once completed.
    pub fn score(&self) -> Result<Score> {
        match self.state {
            SessionState::Completed { score } => Ok(score),
            SessionState::InProgress { .. } => Err(SessionError::NotCompleted),
        }
    }

    /// Per-question outcomes; only available once completed.
    pub fn review(&self) -> Result<Vec<QuestionReview>> {
        if !self.is_completed() {
            return Err(SessionError::NotCompleted);
        }

        Ok(self
            .questions
            .iter()
            .enumerate()
            .map(|(position, q)| {
                let selected = self.answers.get(&position).copied();
                QuestionReview {
                    position,
                    question: q.question.clone(),
                    options: q.options.clone(),
                    selected,
                    correct_answer: q.correct_answer,
                    is_correct: selected.is_some_and(|s| q.is_correct(s)),
                }
            })
            .collect())
    }
}
