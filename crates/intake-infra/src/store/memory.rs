//! In-memory [`CheckpointStore`] backed by `DashMap`.
//!
//! Checkpoints are cloned on read and write so no `DashMap` guard is held
//! across `.await` points. Suits tests and embedded single-process use;
//! state does not survive the process.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

use intake_core::checkpoint::CheckpointStore;
use intake_types::checkpoint::{Checkpoint, ThreadSummary};
use intake_types::error::StoreError;
use intake_types::thread::ThreadId;

/// Concurrent in-memory checkpoint store.
///
/// Cloning produces a shared view of the same underlying data (backed by
/// `Arc`).
#[derive(Clone, Default)]
pub struct MemoryCheckpointStore {
    threads: Arc<DashMap<ThreadId, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            threads: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored threads.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn get(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<Option<Checkpoint>, StoreError>> + Send {
        let found = self.threads.get(thread_id).map(|r| r.value().clone());
        async move { Ok(found) }
    }

    fn put(
        &self,
        thread_id: &ThreadId,
        checkpoint: &Checkpoint,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        // Guard dropped before insert; holding it across would deadlock.
        let existing_created_at = self.threads.get(thread_id).map(|r| r.value().created_at);

        let mut stored = checkpoint.clone();
        if let Some(created_at) = existing_created_at {
            stored.created_at = created_at;
        }
        self.threads.insert(thread_id.clone(), stored);
        async { Ok(()) }
    }

    fn delete(&self, thread_id: &ThreadId) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.threads.remove(thread_id);
        async { Ok(()) }
    }

    fn list_threads(&self) -> impl Future<Output = Result<Vec<ThreadSummary>, StoreError>> + Send {
        let mut summaries: Vec<ThreadSummary> = self
            .threads
            .iter()
            .map(|entry| ThreadSummary {
                thread_id: entry.key().clone(),
                completed: entry.value().completed,
                message_count: entry.value().transcript.len(),
                updated_at: entry.value().updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        async move { Ok(summaries) }
    }
}
