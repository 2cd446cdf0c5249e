//! PostgreSQL record store.
//!
//! Rows are exchanged as JSONB: inserts and updates go through
//! `jsonb_populate_record`, reads come back through `to_jsonb`. Column names
//! are spliced into SQL only after passing the per-kind whitelist. The schema
//! itself is managed by the hosted database.

use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::store::{Filter, Order, RecordKind, RecordStore, StoreError, StoreResult};

/// Record store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Store pointed at a closed port; every query fails.
    #[cfg(test)]
    pub(crate) fn unreachable() -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://quiz@127.0.0.1:1/unreachable")
            .expect("valid database url");
        Self { pool }
    }
}

fn quoted(column: &str) -> String {
    format!("\"{}\"", column)
}

/// Validated column names present in `record`.
fn record_columns(kind: RecordKind, record: &Value) -> StoreResult<Vec<String>> {
    kind.check_record(record)?;
    Ok(record
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default())
}

fn insert_sql(kind: RecordKind, columns: &[String]) -> String {
    let table = kind.table();
    if columns.is_empty() {
        return format!(
            "INSERT INTO {table} DEFAULT VALUES RETURNING to_jsonb({table}.*)"
        );
    }

    let list = columns
        .iter()
        .map(|c| quoted(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({list}) \
         SELECT {list} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING to_jsonb({table}.*)"
    )
}

fn update_sql(kind: RecordKind, columns: &[String]) -> String {
    let table = kind.table();
    let assignments = columns
        .iter()
        .map(|c| format!("{col} = r.{col}", col = quoted(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} SET {assignments} \
         FROM jsonb_populate_record(NULL::{table}, $1) AS r \
         WHERE {table}.id = $2 \
         RETURNING to_jsonb({table}.*)"
    )
}

/// Filter values are compared as text so one statement shape serves every column type.
fn select_sql(kind: RecordKind, filter: &Filter, order: Option<&Order>) -> String {
    let table = kind.table();
    let mut sql = format!("SELECT to_jsonb(t.*) FROM {table} AS t");

    for (i, (column, _)) in filter.conditions().iter().enumerate() {
        let keyword = if i == 0 { "WHERE" } else { "AND" };
        sql.push_str(&format!(" {} t.{}::text = ${}", keyword, quoted(column), i + 1));
    }

    if let Some(order) = order {
        let direction = if order.ascending { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY t.{} {}", quoted(&order.column), direction));
    }
    sql
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RecordStore for PgStore {
    async fn insert(&self, kind: RecordKind, record: Value) -> StoreResult<Value> {
        let columns = record_columns(kind, &record)?;
        let row = sqlx::query_scalar::<_, Value>(&insert_sql(kind, &columns))
            .bind(record)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_many(&self, kind: RecordKind, records: Vec<Value>) -> StoreResult<Vec<Value>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let columns = record_columns(kind, &record)?;
            let row = sqlx::query_scalar::<_, Value>(&insert_sql(kind, &columns))
                .bind(record)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    async fn update(&self, kind: RecordKind, id: Uuid, patch: Value) -> StoreResult<Value> {
        let columns: Vec<String> = record_columns(kind, &patch)?
            .into_iter()
            .filter(|c| c != "id")
            .collect();

        let row = if columns.is_empty() {
            let filter = Filter::new().eq("id", id.to_string());
            self.select(kind, &filter, None).await?.into_iter().next()
        } else {
            sqlx::query_scalar::<_, Value>(&update_sql(kind, &columns))
                .bind(patch)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        };

        row.ok_or(StoreError::NotFound {
            kind: kind.table(),
            id,
        })
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
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

        let sql = select_sql(kind, filter, order);
        let mut query = sqlx::query_scalar::<sqlx::Postgres, Value>(&sql);
        for (_, value) in filter.conditions() {
            query = query.bind(as_text(value));
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}
