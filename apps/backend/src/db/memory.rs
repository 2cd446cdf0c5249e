//! In-process record store used for local development and tests.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{Filter, Order, RecordKind, RecordStore, StoreError, StoreResult};

/// Record store holding every table in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<RecordKind, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill in `id` and generated timestamps the caller left out.
    fn prepare(kind: RecordKind, record: Value) -> StoreResult<Value> {
        kind.check_record(&record)?;
        let Value::Object(mut object) = record else {
            return Err(StoreError::NotAnObject { kind: kind.table() });
        };

        let now = serde_json::to_value(Utc::now())?;
        fill_missing(&mut object, "id", || Value::String(Uuid::new_v4().to_string()));
        for column in kind.generated_timestamps() {
            fill_missing(&mut object, column, || now.clone());
        }

        Ok(Value::Object(object))
    }
}

fn fill_missing(object: &mut Map<String, Value>, column: &str, value: impl FnOnce() -> Value) {
    if object.get(column).map_or(true, Value::is_null) {
        object.insert(column.to_string(), value());
    }
}

fn has_id(row: &Value, id: Uuid) -> bool {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Uuid>().ok())
        .is_some_and(|row_id| row_id == id)
}

impl RecordStore for MemoryStore {
    async fn insert(&self, kind: RecordKind, record: Value) -> StoreResult<Value> {
        let row = Self::prepare(kind, record)?;
        self.tables
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, kind: RecordKind, records: Vec<Value>) -> StoreResult<Vec<Value>> {
        // All records are validated first; a bad one inserts nothing.
        let rows = records
            .into_iter()
            .map(|record| Self::prepare(kind, record))
            .collect::<StoreResult<Vec<_>>>()?;

        self.tables
            .write()
            .await
            .entry(kind)
            .or_default()
            .extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update(&self, kind: RecordKind, id: Uuid, patch: Value) -> StoreResult<Value> {
        kind.check_record(&patch)?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject { kind: kind.table() });
        };

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|row| has_id(row, id)))
            .ok_or(StoreError::NotFound {
                kind: kind.table(),
                id,
            })?;

        if let Value::Object(object) = row {
            for (column, value) in patch {
                if column != "id" {
                    object.insert(column, value);
                }
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&kind) else {
            return Ok(false);
        };

        let before = rows.len();
        rows.retain(|row| !has_id(row, id));
        Ok(rows.len() < before)
    }

    async fn select(
        &self,
        kind: RecordKind,
        filter: &Filter,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Value>> {
        filter.check(kind)?;
        if let Some(order) = order {
            kind.check_column(&order.column)?;
        }

        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&kind)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            // Stable sort keeps insertion order among equal keys.
            rows.sort_by(|a, b| order.compare(a, b));
        }
        Ok(rows)
    }
}
