//! Field declarations and collected field state.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use crate::cast::{CastDef, CastValue};

/// Wire key for the primary value inside a structured update argument.
pub const KEY_VALUE: &str = "value";
/// Wire key for the context note inside a structured update argument.
pub const KEY_CONTEXT: &str = "context";
/// Wire key for the supporting quote inside a structured update argument.
pub const KEY_QUOTE: &str = "as_quote";

/// Wire keys reserved for the primary triplet; cast names may not use them.
pub const RESERVED_KEYS: [&str; 3] = [KEY_VALUE, KEY_CONTEXT, KEY_QUOTE];

/// Declarative visibility condition over already-collected fields.
///
/// Replaces arbitrary predicates so schemas survive the checkpoint boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleWhen {
    /// Field whose collected value gates visibility.
    pub field: String,
    /// Expected primary value; `None` means "collected at all".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
}

/// Validation and behavioral rules attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpecs {
    /// Rules the collected value must satisfy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub musts: Vec<String>,

    /// Rules the collected value must not violate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejects: Vec<String>,

    /// Guidance for eliciting the value; shown to the model, not enforced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// Collected but never echoed back in rendered output or logs.
    #[serde(default)]
    pub confidential: bool,

    /// Collected only after every non-conclude field is filled.
    #[serde(default)]
    pub conclude: bool,

    /// Field participates only once this condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibleWhen>,
}

/// The collected state of one field.
///
/// The reserved wire keys (`value`, `context`, `as_quote`) map to the struct
/// fields here, so a cast name can never collide with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// The elicited value, normalized by the model into plain text.
    pub primary: String,

    /// Conversational context the model attached to the value.
    #[serde(default)]
    pub context: String,

    /// Verbatim quote from the respondent supporting the value.
    #[serde(default)]
    pub quote: String,

    /// Cast results keyed by cast name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub casts: BTreeMap<String, CastValue>,
}

impl FieldValue {
    /// Value with empty context, quote, and casts.
    pub fn of(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            context: String::new(),
            quote: String::new(),
            casts: BTreeMap::new(),
        }
    }

    /// Look up one cast result by its full name.
    pub fn cast(&self, name: &str) -> Option<&CastValue> {
        self.casts.get(name)
    }
}

/// One declared field of an interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    /// Natural-language description; doubles as the elicitation prompt.
    pub description: String,

    #[serde(default)]
    pub specs: FieldSpecs,

    /// Derived transformations, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub casts: Vec<CastDef>,

    /// Collected state; `None` until the model applies a structured update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

impl FieldDef {
    /// Bare field with no specs, casts, or value.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            specs: FieldSpecs::default(),
            casts: Vec::new(),
            value: None,
        }
    }

    /// Look up a declared cast by its full name.
    pub fn cast_def(&self, name: &str) -> Option<&CastDef> {
        self.casts.iter().find(|c| c.name == name)
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }
}
