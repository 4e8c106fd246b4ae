use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Opaque identifier for one conversation thread.
///
/// Callers bring their own identifiers (any string); two distinct ids never
/// collide in any checkpoint store. `generate` mints a UUID v7 (time-sortable)
/// for callers that do not have one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(String);

impl ThreadId {
    /// Wrap a caller-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier using UUID v7 (time-sortable).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_id_display() {
        let id = ThreadId::new("ticket-42");
        assert_eq!(id.to_string(), "ticket-42");
        assert_eq!(id.as_str(), "ticket-42");
    }

    #[test]
    fn test_generate_is_unique() {
        let a = ThreadId::generate();
        let b = ThreadId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_thread_id_serde() {
        let id = ThreadId::new("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let parsed: ThreadId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_from_string() {
        let id: ThreadId = "xyz".into();
        assert_eq!(id, ThreadId::new("xyz"));
    }
}
