//! Chat model implementations.
//!
//! Contains concrete implementations of the [`ChatModel`] trait defined in
//! `intake-core`, currently the Anthropic Messages API.

pub mod anthropic;

pub use anthropic::AnthropicModel;
