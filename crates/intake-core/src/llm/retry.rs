//! Bounded retry with exponential backoff for chat model calls.

use std::time::Duration;

use tracing::warn;

use intake_types::config::RetryPolicy;
use intake_types::llm::{ChatRequest, ChatResponse, LlmError};

use crate::llm::model::ChatModel;

/// Call the model, retrying transient failures per the policy.
///
/// The delay doubles per attempt from `base_delay_ms` up to `max_delay_ms`.
/// A rate-limit response carrying `retry_after_ms` stretches the delay when
/// the server asks for longer than the computed backoff. Non-retryable
/// errors surface immediately.
pub async fn complete_with_retry<M: ChatModel>(
    model: &M,
    request: &ChatRequest,
    policy: &RetryPolicy,
) -> Result<ChatResponse, LlmError> {
    let mut attempt = 1u32;
    loop {
        match model.complete(request).await {
            Ok(response) => return Ok(response),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                let delay = backoff_delay(policy, attempt, &err);
                warn!(
                    backend = model.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "chat request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn backoff_delay(policy: &RetryPolicy, attempt: u32, err: &LlmError) -> Duration {
    // attempt is 1-based; shift capped so the multiplier cannot overflow
    let doubled = policy
        .base_delay_ms
        .saturating_mul(1u64 << (attempt - 1).min(16));
    let mut delay = doubled.min(policy.max_delay_ms);

    if let LlmError::RateLimited {
        retry_after_ms: Some(after),
    } = err
    {
        delay = delay.max(*after);
    }

    Duration::from_millis(delay)
}
