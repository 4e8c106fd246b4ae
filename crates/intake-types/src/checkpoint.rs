//! Persisted thread state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use crate::interview::Interview;
use crate::message::TranscriptMessage;
use crate::thread::ThreadId;

/// Persisted state of one conversation thread.
///
/// Binds an opaque thread id (the store key) to the full message history and
/// the interview snapshot as of the last suspend. Stores upsert on the id and
/// preserve `created_at` across updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Full message history, append-only.
    pub transcript: Vec<TranscriptMessage>,

    /// Interview snapshot as of the last suspend.
    pub snapshot: Interview,

    /// Failed update-application counts per field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attempts: BTreeMap<String, u32>,

    /// Set when the interview reached its natural conclusion.
    #[serde(default)]
    pub completed: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Fresh checkpoint for a new thread with an empty transcript.
    pub fn new(snapshot: Interview) -> Self {
        let now = Utc::now();
        Self {
            transcript: Vec::new(),
            snapshot,
            attempts: BTreeMap::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at` before persisting.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Listing row for stored threads.
///
/// Avoids deserializing the full transcript and snapshot when only metadata
/// is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread_id: ThreadId,
    pub completed: bool,
    pub message_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDef;
    use crate::interview::Role;

    fn test_interview() -> Interview {
        Interview {
            name: "Contact".to_string(),
            description: "Basic contact details".to_string(),
            guide: Role::new("Interviewer"),
            respondent: Role::new("Respondent"),
            fields: vec![FieldDef::new("name", "Full name")],
        }
    }

    #[test]
    fn test_new_checkpoint_is_empty_and_open() {
        let checkpoint = Checkpoint::new(test_interview());
        assert!(checkpoint.transcript.is_empty());
        assert!(checkpoint.attempts.is_empty());
        assert!(!checkpoint.completed);
        assert_eq!(checkpoint.created_at, checkpoint.updated_at);
    }

    #[test]
    fn test_touch_advances_updated_at() {
        let mut checkpoint = Checkpoint::new(test_interview());
        let before = checkpoint.updated_at;
        checkpoint.touch();
        assert!(checkpoint.updated_at >= before);
        assert_eq!(checkpoint.created_at, before);
    }

    #[test]
    fn test_checkpoint_serde_roundtrip() {
        let mut checkpoint = Checkpoint::new(test_interview());
        checkpoint.transcript.push(TranscriptMessage::system("rules"));
        checkpoint.transcript.push(TranscriptMessage::user("hello"));
        checkpoint.attempts.insert("name".to_string(), 2);
        checkpoint.completed = true;

        let json = serde_json::to_string(&checkpoint).unwrap();
        let parsed: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, checkpoint);
    }

    #[test]
    fn test_checkpoint_serde_defaults() {
        let stripped = serde_json::json!({
            "transcript": [],
            "snapshot": serde_json::to_value(test_interview()).unwrap(),
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        });
        let parsed: Checkpoint = serde_json::from_value(stripped).unwrap();
        assert!(parsed.attempts.is_empty());
        assert!(!parsed.completed);
    }
}
