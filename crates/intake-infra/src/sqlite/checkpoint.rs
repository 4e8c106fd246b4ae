//! SQLite implementation of `CheckpointStore`.
//!
//! Persists thread checkpoints in the `checkpoints` table. Transcript,
//! snapshot, and attempt counts are stored as JSON text columns; listing
//! reads `json_array_length(transcript)` so summaries never deserialize
//! full message histories.

use chrono::{DateTime, Utc};
use sqlx::Row;

use intake_core::checkpoint::CheckpointStore;
use intake_types::checkpoint::{Checkpoint, ThreadSummary};
use intake_types::error::StoreError;
use intake_types::thread::ThreadId;

use crate::sqlite::pool::DatabasePool;

/// SQLite-backed checkpoint persistence.
pub struct SqliteCheckpointStore {
    pool: DatabasePool,
}

impl SqliteCheckpointStore {
    /// Create a new checkpoint store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct CheckpointRow {
    transcript: String,
    snapshot: String,
    attempts: String,
    completed: i64,
    created_at: String,
    updated_at: String,
}

impl CheckpointRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            transcript: row.try_get("transcript")?,
            snapshot: row.try_get("snapshot")?,
            attempts: row.try_get("attempts")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_checkpoint(self) -> Result<Checkpoint, StoreError> {
        Ok(Checkpoint {
            transcript: from_json(&self.transcript)?,
            snapshot: from_json(&self.snapshot)?,
            attempts: from_json(&self.attempts)?,
            completed: self.completed != 0,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct ThreadSummaryRow {
    thread_id: String,
    completed: i64,
    message_count: i64,
    updated_at: String,
}

impl ThreadSummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            thread_id: row.try_get("thread_id")?,
            completed: row.try_get("completed")?,
            message_count: row.try_get("message_count")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_summary(self) -> Result<ThreadSummary, StoreError> {
        Ok(ThreadSummary {
            thread_id: ThreadId::new(self.thread_id),
            completed: self.completed != 0,
            message_count: self.message_count as usize,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// CheckpointStore implementation
// ---------------------------------------------------------------------------

impl CheckpointStore for SqliteCheckpointStore {
    async fn get(&self, thread_id: &ThreadId) -> Result<Option<Checkpoint>, StoreError> {
        let row = sqlx::query(
            "SELECT transcript, snapshot, attempts, completed, created_at, updated_at FROM checkpoints WHERE thread_id = ?",
        )
        .bind(thread_id.as_str())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let checkpoint_row = CheckpointRow::from_row(&row)
                    .map_err(|e| StoreError::Query(e.to_string()))?;
                Ok(Some(checkpoint_row.into_checkpoint()?))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, thread_id: &ThreadId, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO checkpoints (thread_id, transcript, snapshot, attempts, completed, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(thread_id) DO UPDATE SET
                   transcript = excluded.transcript,
                   snapshot = excluded.snapshot,
                   attempts = excluded.attempts,
                   completed = excluded.completed,
                   updated_at = excluded.updated_at"#,
        )
        .bind(thread_id.as_str())
        .bind(to_json(&checkpoint.transcript)?)
        .bind(to_json(&checkpoint.snapshot)?)
        .bind(to_json(&checkpoint.attempts)?)
        .bind(checkpoint.completed as i64)
        .bind(format_datetime(&checkpoint.created_at))
        .bind(format_datetime(&checkpoint.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM checkpoints WHERE thread_id = ?")
            .bind(thread_id.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, StoreError> {
        let rows = sqlx::query(
            "SELECT thread_id, completed, json_array_length(transcript) AS message_count, updated_at FROM checkpoints ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let r =
                ThreadSummaryRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            summaries.push(r.into_summary()?);
        }

        Ok(summaries)
    }
}
