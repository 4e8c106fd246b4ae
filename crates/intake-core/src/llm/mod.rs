//! Chat model abstractions for the interview engine.
//!
//! - `ChatModel`: RPITIT trait for concrete model backends
//! - `complete_with_retry`: bounded exponential backoff over transient errors

pub mod model;
pub mod retry;

pub use model::ChatModel;
pub use retry::complete_with_retry;
