//! Generic record store interface.
//!
//! Records travel as JSON objects keyed by column name, the same shape the
//! hosted database exchanges rows in. Every column that reaches a store is
//! checked against the per-kind whitelist below.

use std::cmp::Ordering;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::memory::MemoryStore;
use super::postgres::PgStore;

/// Result type alias using StoreError.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown column '{column}' for {kind}")]
    UnknownColumn { kind: &'static str, column: String },

    #[error("{kind} record must be a JSON object")]
    NotAnObject { kind: &'static str },

    #[error("{kind} record {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
}

/// The four record kinds the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Notes,
    Quizzes,
    QuizQuestions,
    QuizAttempts,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        Self::Notes,
        Self::Quizzes,
        Self::QuizQuestions,
        Self::QuizAttempts,
    ];

    /// Table name in the hosted database.
    pub fn table(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Quizzes => "quizzes",
            Self::QuizQuestions => "quiz_questions",
            Self::QuizAttempts => "quiz_attempts",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Notes => &[
                "id",
                "user_id",
                "title",
                "content",
                "subject",
                "created_at",
                "updated_at",
            ],
            Self::Quizzes => &["id", "note_id", "user_id", "title", "created_at"],
            Self::QuizQuestions => &[
                "id",
                "quiz_id",
                "question",
                "options",
                "correct_answer",
                "order",
            ],
            Self::QuizAttempts => &[
                "id",
                "quiz_id",
                "user_id",
                "score",
                "total_questions",
                "answers",
                "completed_at",
            ],
        }
    }

    /// Timestamp columns filled in on insert when the caller leaves them out.
    pub fn generated_timestamps(self) -> &'static [&'static str] {
        match self {
            Self::Notes => &["created_at", "updated_at"],
            Self::Quizzes => &["created_at"],
            Self::QuizQuestions => &[],
            Self::QuizAttempts => &["completed_at"],
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Reject any column outside this kind's whitelist.
    pub fn check_column(self, column: &str) -> StoreResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn {
                kind: self.table(),
                column: column.to_string(),
            })
        }
    }

    /// Validate that `record` is an object whose keys are all known columns.
    pub fn check_record(self, record: &Value) -> StoreResult<()> {
        let object = record
            .as_object()
            .ok_or(StoreError::NotAnObject { kind: self.table() })?;
        object.keys().try_for_each(|column| self.check_column(column))
    }
}

/// Conjunction of column equality conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn check(&self, kind: RecordKind) -> StoreResult<()> {
        self.conditions
            .iter()
            .try_for_each(|(column, _)| kind.check_column(column))
    }

    /// Whether `row` satisfies every condition.
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| row.get(column).is_some_and(|v| v == expected))
    }
}

/// Single-column ordering.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }

    /// Compare two rows by this ordering's column.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ord = compare_values(
            a.get(&self.column).unwrap_or(&Value::Null),
            b.get(&self.column).unwrap_or(&Value::Null),
        );
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

/// Orders nulls first, then numbers, then strings. Strings that are both
/// RFC 3339 timestamps compare chronologically.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// External record store, generic over record kind.
pub trait RecordStore: Send + Sync {
    /// Persist a record; identity and timestamps are assigned by the store.
    fn insert(&self, kind: RecordKind, record: Value)
        -> impl Future<Output = StoreResult<Value>> + Send;

    /// Persist several records of one kind together.
    fn insert_many(
        &self,
        kind: RecordKind,
        records: Vec<Value>,
    ) -> impl Future<Output = StoreResult<Vec<Value>>> + Send;

    /// Overwrite the given fields of record `id`.
    fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Value,
    ) -> impl Future<Output = StoreResult<Value>> + Send;

    /// Remove record `id`; returns whether it existed.
    fn delete(&self, kind: RecordKind, id: Uuid) -> impl Future<Output = StoreResult<bool>> + Send;

    fn select(
        &self,
        kind: RecordKind,
        filter: &Filter,
        order: Option<&Order>,
    ) -> impl Future<Output = StoreResult<Vec<Value>>> + Send;
}

/// Store backend chosen at startup.
pub enum Store {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Store {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl RecordStore for Store {
    async fn insert(&self, kind: RecordKind, record: Value) -> StoreResult<Value> {
        match self {
            Self::Memory(s) => s.insert(kind, record).await,
            Self::Postgres(s) => s.insert(kind, record).await,
        }
    }

    async fn insert_many(&self, kind: RecordKind, records: Vec<Value>) -> StoreResult<Vec<Value>> {
        match self {
            Self::Memory(s) => s.insert_many(kind, records).await,
            Self::Postgres(s) => s.insert_many(kind, records).await,
        }
    }

    async fn update(&self, kind: RecordKind, id: Uuid, patch: Value) -> StoreResult<Value> {
        match self {
            Self::Memory(s) => s.update(kind, id, patch).await,
            Self::Postgres(s) => s.update(kind, id, patch).await,
        }
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> StoreResult<bool> {
        match self {
            Self::Memory(s) => s.delete(kind, id).await,
            Self::Postgres(s) => s.delete(kind, id).await,
        }
    }

    async fn select(
        &self,
        kind: RecordKind,
        filter: &Filter,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Value>> {
        match self {
            Self::Memory(s) => s.select(kind, filter, order).await,
            Self::Postgres(s) => s.select(kind, filter, order).await,
        }
    }
}
