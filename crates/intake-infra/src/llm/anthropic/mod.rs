//! Anthropic Claude chat model implementation.
//!
//! This module provides the [`AnthropicModel`] which implements the
//! [`ChatModel`](intake_core::llm::ChatModel) trait for the Anthropic
//! Messages API, including tool use for structured field updates.

pub mod client;
pub mod types;

pub use client::AnthropicModel;
