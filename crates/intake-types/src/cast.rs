//! Cast declarations and cast results.
//!
//! A cast is a derived transformation attached to a field: when the model
//! records the field's primary value, it also produces each declared cast's
//! typed result in the same structured update.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Target shape of a cast.
///
/// Choice casts carry their allowed options plus two independent flags:
/// `nullable` permits zero selections, `multi` permits more than one. The
/// four combinations give the cardinality classes exactly-one, zero-or-one,
/// one-or-more, and zero-or-more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CastKind {
    Int,
    Float,
    Bool,
    String,
    StringSet,
    Choice {
        options: Vec<String>,
        #[serde(default)]
        nullable: bool,
        #[serde(default)]
        multi: bool,
    },
}

impl CastKind {
    /// Short label used in validation error messages.
    pub fn label(&self) -> &'static str {
        match self {
            CastKind::Int => "integer",
            CastKind::Float => "number",
            CastKind::Bool => "boolean",
            CastKind::String => "string",
            CastKind::StringSet => "array of strings",
            CastKind::Choice { .. } => "choice",
        }
    }
}

/// A named derived transformation declared on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastDef {
    /// Unique within the field; built from a base keyword plus an optional
    /// sub-name (`as_int`, `as_bool_even`).
    pub name: String,
    pub kind: CastKind,
    /// Extraction instruction shown to the model for this cast.
    pub prompt: String,
}

impl CastDef {
    pub fn new(
        base: &str,
        sub: Option<&str>,
        kind: CastKind,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: cast_name(base, sub),
            kind,
            prompt: prompt.into(),
        }
    }
}

/// Build a cast's name from its base keyword and optional sub-name.
pub fn cast_name(base: &str, sub: Option<&str>) -> String {
    match sub {
        Some(sub) => format!("{base}_{sub}"),
        None => base.to_string(),
    }
}

/// Typed result of one cast, keyed by the cast's name inside a field value.
///
/// `Choice` holds the chosen options in submission order; an empty list is a
/// valid result for nullable choice casts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CastValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Set(Vec<String>),
    Choice(Vec<String>),
}

impl CastValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CastValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CastValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            CastValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CastValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&[String]> {
        match self {
            CastValue::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Chosen options of a choice cast, empty for zero selections.
    pub fn selections(&self) -> Option<&[String]> {
        match self {
            CastValue::Choice(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for CastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastValue::Bool(b) => write!(f, "{b}"),
            CastValue::Int(i) => write!(f, "{i}"),
            CastValue::Float(x) => write!(f, "{x}"),
            CastValue::Text(s) => write!(f, "{s}"),
            CastValue::Set(items) | CastValue::Choice(items) => {
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_name_without_sub() {
        assert_eq!(cast_name("as_int", None), "as_int");
    }

    #[test]
    fn test_cast_name_with_sub() {
        assert_eq!(cast_name("as_bool", Some("even")), "as_bool_even");
    }

    #[test]
    fn test_cast_def_new_builds_name() {
        let def = CastDef::new("as_lang", Some("fr"), CastKind::String, "Translate to French");
        assert_eq!(def.name, "as_lang_fr");
        assert_eq!(def.kind, CastKind::String);
        assert_eq!(def.prompt, "Translate to French");
    }

    #[test]
    fn test_cast_kind_serde() {
        let kind = CastKind::Choice {
            options: vec!["red".to_string(), "blue".to_string()],
            nullable: true,
            multi: false,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "choice");
        assert_eq!(json["options"][1], "blue");
        assert_eq!(json["nullable"], true);
        let parsed: CastKind = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn test_cast_kind_choice_flags_default_false() {
        let json = serde_json::json!({"kind": "choice", "options": ["a"]});
        let parsed: CastKind = serde_json::from_value(json).unwrap();
        match parsed {
            CastKind::Choice { nullable, multi, .. } => {
                assert!(!nullable);
                assert!(!multi);
            }
            other => panic!("expected choice, got {other:?}"),
        }
    }

    #[test]
    fn test_cast_value_serde_roundtrip() {
        let values = vec![
            CastValue::Bool(true),
            CastValue::Int(-3),
            CastValue::Float(2.5),
            CastValue::Text("hi".to_string()),
            CastValue::Set(vec!["a".to_string(), "b".to_string()]),
            CastValue::Choice(vec!["red".to_string()]),
        ];
        for value in values {
            let json = serde_json::to_string(&value).unwrap();
            let parsed: CastValue = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_cast_value_accessors() {
        assert_eq!(CastValue::Int(4).as_int(), Some(4));
        assert_eq!(CastValue::Int(4).as_bool(), None);
        assert_eq!(CastValue::Bool(false).as_bool(), Some(false));
        assert_eq!(CastValue::Text("x".to_string()).as_text(), Some("x"));
        let choice = CastValue::Choice(vec![]);
        assert_eq!(choice.selections(), Some(&[] as &[String]));
    }

    #[test]
    fn test_cast_value_display() {
        assert_eq!(CastValue::Int(7).to_string(), "7");
        assert_eq!(
            CastValue::Choice(vec!["a".to_string(), "b".to_string()]).to_string(),
            "[a, b]"
        );
    }

    #[test]
    fn test_cast_kind_label() {
        assert_eq!(CastKind::Int.label(), "integer");
        assert_eq!(CastKind::StringSet.label(), "array of strings");
    }
}
