//! Typed repository over the record store

mod memory;
mod postgres;
mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Filter, Order, RecordKind, RecordStore, Store, StoreError, StoreResult};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper converting rows to typed records
pub struct Database {
    store: Store,
}

fn encode<T: Serialize>(record: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(record)?)
}

fn decode<T: DeserializeOwned>(row: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(row)?)
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

fn owned_by(user_id: Uuid) -> Filter {
    Filter::new().eq("user_id", user_id.to_string())
}

impl Database {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Database backed by the in-process store
    pub fn in_memory() -> Self {
        Self::new(Store::Memory(MemoryStore::new()))
    }

    /// Connect to PostgreSQL when configured, otherwise fall back to memory
    pub async fn connect(config: &Config) -> Result<Self> {
        match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url, config.database_max_connections).await?;
                Ok(Self::new(Store::Postgres(store)))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, records are kept in memory only");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// First row owned by `user_id` with the given id.
    async fn find_owned<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<T> {
        let filter = owned_by(user_id).eq("id", id.to_string());
        let row = self
            .store
            .select(kind, &filter, None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{} {}", kind.table(), id)))?;

        Ok(decode(row)?)
    }

    // === Note Repository ===

    /// Get all notes for a user, most recently updated first
    pub async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let rows = self
            .store
            .select(
                RecordKind::Notes,
                &owned_by(user_id),
                Some(&Order::desc("updated_at")),
            )
            .await?;
        Ok(decode_all(rows)?)
    }

    pub async fn get_note(&self, user_id: Uuid, note_id: Uuid) -> Result<Note> {
        self.find_owned(RecordKind::Notes, user_id, note_id).await
    }

    pub async fn create_note(&self, user_id: Uuid, req: &NoteRequest) -> Result<Note> {
        let draft = NewNote {
            user_id,
            title: req.title.clone(),
            content: req.content.clone(),
            subject: req.subject.clone(),
        };
        let row = self.store.insert(RecordKind::Notes, encode(&draft)?).await?;
        Ok(decode(row)?)
    }

    /// Overwrite a note's editable fields and bump `updated_at`
    pub async fn update_note(&self, user_id: Uuid, note_id: Uuid, req: &NoteRequest) -> Result<Note> {
        self.get_note(user_id, note_id).await?;

        let patch = NotePatch {
            title: req.title.clone(),
            content: req.content.clone(),
            subject: req.subject.clone(),
            updated_at: Utc::now(),
        };
        let row = self
            .store
            .update(RecordKind::Notes, note_id, encode(&patch)?)
            .await?;
        Ok(decode(row)?)
    }

    /// Delete a note. Quizzes generated from it are kept.
    pub async fn delete_note(&self, user_id: Uuid, note_id: Uuid) -> Result<()> {
        self.get_note(user_id, note_id).await?;

        if !self.store.delete(RecordKind::Notes, note_id).await? {
            return Err(ApiError::NotFound(format!("notes {}", note_id)));
        }
        Ok(())
    }

    // === Quiz Repository ===

    /// Persist a quiz for `note` together with its questions in generation order
    pub async fn create_quiz(
        &self,
        note: &Note,
        questions: &[GeneratedQuestion],
    ) -> Result<(Quiz, Vec<QuizQuestion>)> {
        let draft = NewQuiz {
            note_id: note.id,
            user_id: note.user_id,
            title: Quiz::title_for(&note.title),
        };
        let quiz: Quiz = decode(self.store.insert(RecordKind::Quizzes, encode(&draft)?).await?)?;

        let drafts = questions
            .iter()
            .enumerate()
            .map(|(order, q)| encode(&NewQuizQuestion::from_generated(quiz.id, order, q)))
            .collect::<StoreResult<Vec<_>>>()?;
        let rows = self.store.insert_many(RecordKind::QuizQuestions, drafts).await?;

        let mut saved: Vec<QuizQuestion> = decode_all(rows)?;
        saved.sort_by_key(|q| q.order);
        Ok((quiz, saved))
    }

    /// Get all quizzes for a user, newest first
    pub async fn list_quizzes(&self, user_id: Uuid) -> Result<Vec<Quiz>> {
        let rows = self
            .store
            .select(
                RecordKind::Quizzes,
                &owned_by(user_id),
                Some(&Order::desc("created_at")),
            )
            .await?;
        Ok(decode_all(rows)?)
    }

    pub async fn get_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Quiz> {
        self.find_owned(RecordKind::Quizzes, user_id, quiz_id).await
    }

    /// Questions of a quiz ordered by position
    pub async fn get_questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>> {
        let rows = self
            .store
            .select(
                RecordKind::QuizQuestions,
                &Filter::new().eq("quiz_id", quiz_id.to_string()),
                Some(&Order::asc("order")),
            )
            .await?;
        Ok(decode_all(rows)?)
    }

    // === Attempt Repository ===

    pub async fn insert_attempt(&self, attempt: &NewAttempt) -> Result<QuizAttempt> {
        let row = self
            .store
            .insert(RecordKind::QuizAttempts, encode(attempt)?)
            .await?;
        Ok(decode(row)?)
    }

    /// Attempts by a user on one quiz, most recent first
    pub async fn list_attempts(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<QuizAttempt>> {
        let filter = owned_by(user_id).eq("quiz_id", quiz_id.to_string());
        let rows = self
            .store
            .select(
                RecordKind::QuizAttempts,
                &filter,
                Some(&Order::desc("completed_at")),
            )
            .await?;
        Ok(decode_all(rows)?)
    }
}
