//! Conversation engine and trait definitions for Intake.
//!
//! This crate holds the turn state machine, schema construction, cast
//! validation, prompt synthesis, and the "ports" (`ChatModel`,
//! `CheckpointStore`) that the infrastructure layer implements. It depends
//! only on `intake-types` -- never on `intake-infra` or any IO crate.

pub mod cast;
pub mod checkpoint;
pub mod interview;
pub mod llm;
pub mod machine;
pub mod prompt;
pub mod tool;
