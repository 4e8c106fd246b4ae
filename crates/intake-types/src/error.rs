use thiserror::Error;

use crate::llm::LlmError;

/// A cast value failed validation against its declared shape.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("cast '{cast}' expects {expected}, got {got}")]
    WrongType {
        cast: String,
        expected: String,
        got: String,
    },

    #[error("cast '{cast}': '{option}' is not one of the allowed options")]
    UnknownOption { cast: String, option: String },

    #[error("cast '{cast}' requires at least one selection")]
    EmptySelection { cast: String },

    #[error("cast '{cast}' allows only one selection, got {got}")]
    TooManySelections { cast: String, got: usize },
}

/// A structured update could not be applied to the interview snapshot.
///
/// Recovered locally: the engine reports the failure back to the model as an
/// error tool result and the conversation continues.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool arguments must be a JSON object")]
    MalformedArguments,

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' update must be a JSON object")]
    MalformedField { field: String },

    #[error("field '{field}' update lacks a 'value' entry")]
    MissingValue { field: String },

    #[error("field '{field}' entry '{key}' must be a {expected}")]
    WrongEntryType {
        field: String,
        key: String,
        expected: String,
    },

    #[error("field '{field}' carries unknown entry '{key}'")]
    UnknownKey { field: String, key: String },

    #[error("field '{field}': {source}")]
    Cast {
        field: String,
        #[source]
        source: CastError,
    },
}

impl ApplyError {
    /// The field the failure is attributed to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ApplyError::UnknownField(field)
            | ApplyError::MalformedField { field }
            | ApplyError::MissingValue { field }
            | ApplyError::WrongEntryType { field, .. }
            | ApplyError::UnknownKey { field, .. }
            | ApplyError::Cast { field, .. } => Some(field),
            ApplyError::UnknownTool(_) | ApplyError::MalformedArguments => None,
        }
    }
}

/// An interview schema failed construction-time validation.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("field '{0}' is declared twice")]
    DuplicateField(String),

    #[error("field '{field}' declares cast '{cast}' twice")]
    DuplicateCast { field: String, cast: String },

    #[error("field '{field}' cast name '{cast}' is reserved")]
    ReservedCastName { field: String, cast: String },

    #[error("field '{field}' visibility depends on undeclared field '{depends_on}'")]
    UnknownVisibilityField { field: String, depends_on: String },
}

/// Errors surfaced to the caller of a driving call.
#[derive(Debug, Error)]
pub enum TurnError {
    /// An expected message type is absent where the conversation structure
    /// requires it. Fatal for the turn; not retried.
    #[error("conversation structure violated: {0}")]
    StructuralInvariant(String),

    #[error("chat model failed: {0}")]
    Model(#[from] LlmError),

    #[error("checkpoint store failed: {0}")]
    Store(#[from] StoreError),

    /// A field kept failing validation past the configured budget. State is
    /// persisted before this surfaces, so the thread remains resumable.
    #[error("field '{field}' failed validation {attempts} times")]
    ValidationExhausted { field: String, attempts: u32 },

    #[error("turn exceeded {steps} state transitions")]
    StepLimitExceeded { steps: u32 },
}

/// Errors from checkpoint store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
