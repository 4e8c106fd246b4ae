//! Shared domain types for Intake.
//!
//! This crate contains the core domain types used across the Intake engine:
//! Interview, FieldDef, CastDef, the transcript message shapes, checkpoints,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod cast;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod field;
pub mod interview;
pub mod llm;
pub mod message;
pub mod thread;
