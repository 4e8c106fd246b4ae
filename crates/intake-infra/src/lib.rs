//! Infrastructure layer for Intake.
//!
//! Contains implementations of the ports defined in `intake-core`: SQLite
//! and in-memory checkpoint stores, the Anthropic Messages API chat model,
//! and the configuration file loader.

pub mod config;
pub mod llm;
pub mod sqlite;
pub mod store;
