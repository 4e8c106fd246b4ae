//! The interview aggregate: what to collect and who is talking.

use serde::{Deserialize, Serialize};

use crate::field::FieldDef;

/// Behavioral trait attached to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTrait {
    /// What the trait asks the role to do.
    pub description: String,

    /// Activation trigger; `None` means always active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl RoleTrait {
    pub fn always(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            trigger: None,
        }
    }

    pub fn when(trigger: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            trigger: Some(trigger.into()),
        }
    }
}

/// One of the two conversation roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Display name used in prompt text.
    pub name: String,

    /// Traits in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<RoleTrait>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: Vec::new(),
        }
    }
}

/// A declared collection: type name, description, two roles, and the ordered
/// fields to gather.
///
/// The schema (roles, fields, casts, specs) is fixed at construction; only
/// field values mutate afterwards, and only through validated application of
/// a model-requested structured update. Field declaration order is preserved
/// and semantically meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    /// Type name of the collection (e.g. "BugReport").
    pub name: String,

    /// What this interview is about.
    pub description: String,

    /// The role guiding the conversation.
    pub guide: Role,

    /// The role supplying the answers.
    pub respondent: Role,

    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

impl Interview {
    /// Whether every declared field holds a value.
    ///
    /// Vacuously true for an interview with zero fields.
    pub fn done(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_some())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDef> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}
