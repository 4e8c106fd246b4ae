//! Transcript message shapes.
//!
//! A thread's transcript is an append-only sequence of these messages. It is
//! never truncated, reordered, or rewritten; every turn only appends.

use serde::{Deserialize, Serialize};

/// A structured update requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back in the tool result.
    pub id: String,

    /// Tool name the model invoked.
    pub name: String,

    /// Raw JSON arguments, one key per field.
    pub arguments: serde_json::Value,
}

/// One entry in a thread's transcript.
///
/// A `ToolResult` never counts as a user-visible assistant message; it exists
/// so the model sees the outcome of its own structured update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TranscriptMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call: Option<ToolCall>,
    },
    ToolResult {
        call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl TranscriptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_call: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn tool_error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, TranscriptMessage::System { .. })
    }

    /// Assistant message with no structured call attached.
    pub fn is_spoken_assistant(&self) -> bool {
        matches!(
            self,
            TranscriptMessage::Assistant {
                tool_call: None,
                ..
            }
        )
    }
}
