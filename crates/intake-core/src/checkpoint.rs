//! Thread checkpoint persistence trait.
//!
//! Defines `CheckpointStore` for suspending and resuming interview threads.
//! Every `LISTEN` suspend persists the thread's transcript and snapshot; the
//! next driving call restores them and resumes the conversation, so a thread
//! survives process restarts.

use std::future::Future;

use intake_types::checkpoint::{Checkpoint, ThreadSummary};
use intake_types::error::StoreError;
use intake_types::thread::ThreadId;

/// Persistence interface for interview thread checkpoints.
///
/// Uses RPITIT (return position `impl Trait` in traits) consistent with
/// all async traits in this project.
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint for a thread.
    ///
    /// Returns `None` for an unknown thread; the caller treats that as a
    /// fresh conversation.
    fn get(
        &self,
        thread_id: &ThreadId,
    ) -> impl Future<Output = Result<Option<Checkpoint>, StoreError>> + Send;

    /// Save or update a thread's checkpoint (upsert on thread id).
    ///
    /// An upsert keeps the existing `created_at`; only `updated_at` moves.
    fn put(
        &self,
        thread_id: &ThreadId,
        checkpoint: &Checkpoint,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a thread's checkpoint.
    ///
    /// No-op if the thread does not exist.
    fn delete(&self, thread_id: &ThreadId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// List all known threads as lightweight summaries.
    ///
    /// Ordered by `updated_at` descending (most recently touched first).
    fn list_threads(&self) -> impl Future<Output = Result<Vec<ThreadSummary>, StoreError>> + Send;
}
