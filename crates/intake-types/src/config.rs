//! Engine configuration types.
//!
//! `InterviewerConfig` controls the chat backend parameters, the per-field
//! validation budget, and the transient-failure retry policy. Loaded from
//! TOML by embedding applications; all fields have sensible defaults.

use serde::{Deserialize, Serialize};

/// Tuning for the conversation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewerConfig {
    /// Model identifier passed to the chat backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per assistant turn.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; `None` uses the backend default.
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Failed update applications tolerated per field before the turn
    /// surfaces the failure to the caller as unresolved.
    #[serde(default = "default_max_field_attempts")]
    pub max_field_attempts: u32,

    /// State transitions allowed within one driving call. Guards against a
    /// model that keeps requesting updates without ever speaking.
    #[serde(default = "default_max_turn_steps")]
    pub max_turn_steps: u32,

    /// Backoff policy for transient chat backend failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_field_attempts() -> u32 {
    3
}

fn default_max_turn_steps() -> u32 {
    32
}

impl Default for InterviewerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            max_field_attempts: default_max_field_attempts(),
            max_turn_steps: default_max_turn_steps(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Backoff policy for transient chat backend failures.
///
/// Only retryable error classes (rate limit, overload, transport) are
/// retried; everything else surfaces immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles per attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Ceiling for the computed delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}
