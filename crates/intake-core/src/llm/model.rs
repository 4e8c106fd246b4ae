//! ChatModel trait definition.
//!
//! The single abstraction the turn machine speaks to. Implementations live
//! in intake-infra (e.g., `AnthropicModel`).

use std::future::Future;

use intake_types::llm::{ChatRequest, ChatResponse, LlmError};

/// Trait for chat model backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) consistent
/// with all async traits in this project.
pub trait ChatModel: Send + Sync {
    /// Human-readable backend name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send one chat request and receive the full response.
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, LlmError>> + Send;
}
