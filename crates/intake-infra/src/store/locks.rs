//! Per-thread serialization for driving calls.
//!
//! The engine's read-modify-write cycle against the checkpoint store is not
//! atomic, so two concurrent driving calls for the same thread would race.
//! `ThreadLocks` hands out one async mutex per thread id; callers hold the
//! guard for the duration of a driving call. Distinct threads never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use intake_types::thread::ThreadId;

/// Registry of per-thread async locks.
///
/// Cloning produces a shared view of the same registry. Locks are created
/// lazily on first use and kept for the life of the registry.
#[derive(Clone, Default)]
pub struct ThreadLocks {
    locks: Arc<DashMap<ThreadId, Arc<Mutex<()>>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// The lock for one thread. The `Arc` is cloned out immediately so no
    /// `DashMap` guard is held while awaiting the mutex.
    pub fn lock_for(&self, thread_id: &ThreadId) -> Arc<Mutex<()>> {
        self.locks
            .entry(thread_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
