//! In-memory checkpoint storage and per-thread turn locks.

pub mod locks;
pub mod memory;

pub use locks::ThreadLocks;
pub use memory::MemoryCheckpointStore;
