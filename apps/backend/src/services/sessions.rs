//! In-memory registry of running quiz sessions.

use std::collections::HashMap;
use std::time::Duration;

use quiz_core::{Progress, QuizSession};
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{NewAttempt, QuestionView, Quiz, QuizQuestion, SessionView};

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// A session together with its owner and quiz.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub user_id: Uuid,
    pub quiz: Quiz,
    pub session: QuizSession,
    /// Last time the owner started, answered or advanced the session.
    pub last_active: Instant,
}

impl ActiveSession {
    /// Client-facing view; correct answers appear only in the completed review.
    pub fn view(&self, session_id: Uuid, attempt_id: Option<Uuid>) -> SessionView {
        let current = self.session.current_question().map(|q| QuestionView {
            position: self.session.position().unwrap_or_default(),
            question: q.question.clone(),
            options: q.options.clone(),
        });

        SessionView {
            session_id,
            quiz_id: self.quiz.id,
            quiz_title: self.quiz.title.clone(),
            total_questions: self.session.len(),
            state: self.session.state(),
            current,
            selected: self.session.selected_answer(),
            percent: self.session.score().ok().map(|s| s.percent()),
            review: self.session.review().ok(),
            attempt_id,
        }
    }

    /// Attempt record for a completed session.
    pub fn attempt(&self) -> Result<NewAttempt> {
        let score = self.session.score()?;
        Ok(NewAttempt {
            quiz_id: self.quiz.id,
            user_id: self.user_id,
            score: score.correct,
            total_questions: score.total,
            answers: self.session.answers().clone(),
        })
    }
}

/// Result of advancing a session.
#[derive(Debug)]
pub enum Advanced {
    /// Still running; the updated view.
    Next(SessionView),
    /// Finished and removed from the registry.
    Completed(ActiveSession),
}

/// Running sessions keyed by session id
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, ActiveSession>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Start a session over `questions` for `user_id`.
    ///
    /// Idle sessions are swept first, and the user's unfinished session on the
    /// same quiz is replaced.
    pub async fn start(
        &self,
        user_id: Uuid,
        quiz: Quiz,
        questions: Vec<QuizQuestion>,
    ) -> Result<SessionView> {
        let active = ActiveSession {
            user_id,
            quiz,
            session: QuizSession::new(questions)?,
            last_active: Instant::now(),
        };
        let session_id = Uuid::new_v4();
        let view = active.view(session_id, None);

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, existing| {
            existing.last_active.elapsed() < self.idle_timeout
                && !(existing.user_id == user_id && existing.quiz.id == view.quiz_id)
        });
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped idle or replaced quiz sessions");
        }

        sessions.insert(session_id, active);
        tracing::info!(%session_id, quiz_id = %view.quiz_id, "Quiz session started");
        Ok(view)
    }

    pub async fn view(&self, user_id: Uuid, session_id: Uuid) -> Result<SessionView> {
        let sessions = self.sessions.read().await;
        let active = owned(sessions.get(&session_id), user_id, session_id)?;
        Ok(active.view(session_id, None))
    }

    pub async fn select_answer(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        option: usize,
    ) -> Result<SessionView> {
        let mut sessions = self.sessions.write().await;
        let active = owned_mut(sessions.get_mut(&session_id), user_id, session_id)?;
        active.session.select_answer(option)?;
        active.last_active = Instant::now();
        Ok(active.view(session_id, None))
    }

    /// Advance a session; a completed session leaves the registry.
    pub async fn advance(&self, user_id: Uuid, session_id: Uuid) -> Result<Advanced> {
        let mut sessions = self.sessions.write().await;
        let active = owned_mut(sessions.get_mut(&session_id), user_id, session_id)?;

        match active.session.advance()? {
            Progress::Next { .. } => {
                active.last_active = Instant::now();
                Ok(Advanced::Next(active.view(session_id, None)))
            }
            Progress::Completed(score) => {
                tracing::info!(
                    %session_id,
                    correct = score.correct,
                    total = score.total,
                    "Quiz session completed"
                );
                sessions
                    .remove(&session_id)
                    .map(Advanced::Completed)
                    .ok_or_else(|| ApiError::Internal(format!("session {} vanished", session_id)))
            }
        }
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Persist the attempt of a completed session and build its final view.
///
/// A failed save still returns the results, without an `attempt_id`.
pub async fn record_completion(
    db: &Database,
    session_id: Uuid,
    active: &ActiveSession,
) -> SessionView {
    let saved = match active.attempt() {
        Ok(attempt) => db.insert_attempt(&attempt).await,
        Err(err) => Err(err),
    };

    match saved {
        Ok(attempt) => {
            tracing::info!(attempt_id = %attempt.id, quiz_id = %attempt.quiz_id, "Saved quiz attempt");
            active.view(session_id, Some(attempt.id))
        }
        Err(err) => {
            tracing::error!(%session_id, error = %err, "Failed to save quiz attempt");
            active.view(session_id, None)
        }
    }
}

fn not_found(session_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("session {}", session_id))
}

/// Sessions of other users are reported as missing.
fn owned(active: Option<&ActiveSession>, user_id: Uuid, session_id: Uuid) -> Result<&ActiveSession> {
    active
        .filter(|a| a.user_id == user_id)
        .ok_or_else(|| not_found(session_id))
}

fn owned_mut(
    active: Option<&mut ActiveSession>,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<&mut ActiveSession> {
    active
        .filter(|a| a.user_id == user_id)
        .ok_or_else(|| not_found(session_id))
}
