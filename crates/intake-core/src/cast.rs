//! Cast validation and schema fragments.
//!
//! Validates raw JSON from a structured update against a field's declared
//! casts, and emits each cast's JSON Schema fragment for tool construction.

use intake_types::cast::{CastDef, CastKind, CastValue};
use intake_types::error::CastError;

/// Validate one submitted cast value against its declaration.
///
/// Returns `Ok(None)` when the submission should be treated as absent: the
/// tool schema solicits every cast alongside the primary value, but an
/// unsupplied cast is accepted and simply stays out of the value record. A
/// JSON `null` counts as absent for every kind except a nullable choice,
/// where it is a valid zero-selection result.
pub fn validate_cast(def: &CastDef, raw: &serde_json::Value) -> Result<Option<CastValue>, CastError> {
    if raw.is_null() {
        return match &def.kind {
            CastKind::Choice { nullable: true, .. } => Ok(Some(CastValue::Choice(Vec::new()))),
            _ => Ok(None),
        };
    }

    match &def.kind {
        CastKind::Int => raw
            .as_i64()
            .map(|i| Some(CastValue::Int(i)))
            .ok_or_else(|| wrong_type(def, raw)),
        CastKind::Float => raw
            .as_f64()
            .map(|f| Some(CastValue::Float(f)))
            .ok_or_else(|| wrong_type(def, raw)),
        CastKind::Bool => raw
            .as_bool()
            .map(|b| Some(CastValue::Bool(b)))
            .ok_or_else(|| wrong_type(def, raw)),
        CastKind::String => raw
            .as_str()
            .map(|s| Some(CastValue::Text(s.to_string())))
            .ok_or_else(|| wrong_type(def, raw)),
        CastKind::StringSet => {
            let items = string_items(def, raw)?;
            Ok(Some(CastValue::Set(dedup(items))))
        }
        CastKind::Choice {
            options,
            nullable,
            multi,
        } => {
            // A bare string is accepted as a single selection.
            let submitted = match raw.as_str() {
                Some(s) => vec![s.to_string()],
                None => string_items(def, raw)?,
            };
            let selections = dedup(submitted);

            for option in &selections {
                if !options.contains(option) {
                    return Err(CastError::UnknownOption {
                        cast: def.name.clone(),
                        option: option.clone(),
                    });
                }
            }
            if selections.is_empty() && !nullable {
                return Err(CastError::EmptySelection {
                    cast: def.name.clone(),
                });
            }
            if selections.len() > 1 && !multi {
                return Err(CastError::TooManySelections {
                    cast: def.name.clone(),
                    got: selections.len(),
                });
            }

            Ok(Some(CastValue::Choice(selections)))
        }
    }
}

/// JSON Schema fragment for one cast, used as a property in the tool schema.
pub fn schema_fragment(def: &CastDef) -> serde_json::Value {
    let mut fragment = match &def.kind {
        CastKind::Int => serde_json::json!({"type": "integer"}),
        CastKind::Float => serde_json::json!({"type": "number"}),
        CastKind::Bool => serde_json::json!({"type": "boolean"}),
        CastKind::String => serde_json::json!({"type": "string"}),
        CastKind::StringSet => serde_json::json!({
            "type": "array",
            "items": {"type": "string"},
            "uniqueItems": true,
        }),
        CastKind::Choice {
            options,
            nullable,
            multi,
        } => match (nullable, multi) {
            (false, false) => serde_json::json!({"type": "string", "enum": options}),
            (true, false) => serde_json::json!({
                "anyOf": [
                    {"type": "string", "enum": options},
                    {"type": "null"},
                ],
            }),
            (false, true) => serde_json::json!({
                "type": "array",
                "items": {"type": "string", "enum": options},
                "minItems": 1,
            }),
            (true, true) => serde_json::json!({
                "type": "array",
                "items": {"type": "string", "enum": options},
            }),
        },
    };

    fragment["description"] = serde_json::Value::String(def.prompt.clone());
    fragment
}

fn string_items(def: &CastDef, raw: &serde_json::Value) -> Result<Vec<String>, CastError> {
    let array = raw.as_array().ok_or_else(|| wrong_type(def, raw))?;
    array
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_type(def, item))
        })
        .collect()
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn wrong_type(def: &CastDef, raw: &serde_json::Value) -> CastError {
    CastError::WrongType {
        cast: def.name.clone(),
        expected: def.kind.label().to_string(),
        got: json_type_name(raw).to_string(),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn int_cast() -> CastDef {
        CastDef::new("as_int", None, CastKind::Int, "Parse as integer")
    }

    fn choice_cast(nullable: bool, multi: bool) -> CastDef {
        CastDef::new(
            "as_choice",
            None,
            CastKind::Choice {
                options: vec!["red".to_string(), "green".to_string(), "blue".to_string()],
                nullable,
                multi,
            },
            "Pick a color",
        )
    }

    #[test]
    fn test_int_accepts_integer() {
        let value = validate_cast(&int_cast(), &json!(4)).unwrap();
        assert_eq!(value, Some(CastValue::Int(4)));
    }

    #[test]
    fn test_int_rejects_fraction_and_string() {
        assert!(validate_cast(&int_cast(), &json!(4.5)).is_err());
        let err = validate_cast(&int_cast(), &json!("4")).unwrap_err();
        assert!(err.to_string().contains("expects integer, got string"));
    }

    #[test]
    fn test_float_accepts_integer_and_fraction() {
        let def = CastDef::new("as_float", None, CastKind::Float, "As number");
        assert_eq!(
            validate_cast(&def, &json!(4)).unwrap(),
            Some(CastValue::Float(4.0))
        );
        assert_eq!(
            validate_cast(&def, &json!(2.5)).unwrap(),
            Some(CastValue::Float(2.5))
        );
    }

    #[test]
    fn test_bool_and_string() {
        let def = CastDef::new("as_bool", Some("even"), CastKind::Bool, "True when even");
        assert_eq!(
            validate_cast(&def, &json!(true)).unwrap(),
            Some(CastValue::Bool(true))
        );

        let def = CastDef::new("as_lang", Some("fr"), CastKind::String, "In French");
        assert_eq!(
            validate_cast(&def, &json!("quatre")).unwrap(),
            Some(CastValue::Text("quatre".to_string()))
        );
    }

    #[test]
    fn test_string_set_dedups_preserving_order() {
        let def = CastDef::new("as_set", None, CastKind::StringSet, "Keywords");
        let value = validate_cast(&def, &json!(["b", "a", "b"])).unwrap();
        assert_eq!(
            value,
            Some(CastValue::Set(vec!["b".to_string(), "a".to_string()]))
        );
    }

    #[test]
    fn test_string_set_rejects_non_string_items() {
        let def = CastDef::new("as_set", None, CastKind::StringSet, "Keywords");
        assert!(validate_cast(&def, &json!(["a", 3])).is_err());
    }

    #[test]
    fn test_null_is_absent_for_non_choice() {
        assert_eq!(validate_cast(&int_cast(), &json!(null)).unwrap(), None);
    }

    #[test]
    fn test_exactly_one_choice() {
        let def = choice_cast(false, false);
        assert_eq!(
            validate_cast(&def, &json!("red")).unwrap(),
            Some(CastValue::Choice(vec!["red".to_string()]))
        );
        assert!(matches!(
            validate_cast(&def, &json!([])),
            Err(CastError::EmptySelection { .. })
        ));
        assert!(matches!(
            validate_cast(&def, &json!(["red", "blue"])),
            Err(CastError::TooManySelections { got: 2, .. })
        ));
        // Null is not a selection for a non-nullable choice
        assert_eq!(validate_cast(&def, &json!(null)).unwrap(), None);
    }

    #[test]
    fn test_zero_or_one_choice() {
        let def = choice_cast(true, false);
        assert_eq!(
            validate_cast(&def, &json!(null)).unwrap(),
            Some(CastValue::Choice(vec![]))
        );
        assert_eq!(
            validate_cast(&def, &json!("green")).unwrap(),
            Some(CastValue::Choice(vec!["green".to_string()]))
        );
        assert!(matches!(
            validate_cast(&def, &json!(["red", "blue"])),
            Err(CastError::TooManySelections { .. })
        ));
    }

    #[test]
    fn test_one_or_more_choice() {
        let def = choice_cast(false, true);
        assert_eq!(
            validate_cast(&def, &json!(["red", "blue"])).unwrap(),
            Some(CastValue::Choice(vec![
                "red".to_string(),
                "blue".to_string()
            ]))
        );
        assert!(matches!(
            validate_cast(&def, &json!([])),
            Err(CastError::EmptySelection { .. })
        ));
    }

    #[test]
    fn test_zero_or_more_choice() {
        let def = choice_cast(true, true);
        assert_eq!(
            validate_cast(&def, &json!([])).unwrap(),
            Some(CastValue::Choice(vec![]))
        );
        assert_eq!(
            validate_cast(&def, &json!(["red", "green", "blue"])).unwrap(),
            Some(CastValue::Choice(vec![
                "red".to_string(),
                "green".to_string(),
                "blue".to_string()
            ]))
        );
    }

    #[test]
    fn test_choice_rejects_unknown_option() {
        let def = choice_cast(true, true);
        let err = validate_cast(&def, &json!(["purple"])).unwrap_err();
        assert!(matches!(err, CastError::UnknownOption { ref option, .. } if option == "purple"));
    }

    #[test]
    fn test_choice_dedups_duplicate_selection() {
        let def = choice_cast(false, true);
        assert_eq!(
            validate_cast(&def, &json!(["red", "red"])).unwrap(),
            Some(CastValue::Choice(vec!["red".to_string()]))
        );
    }

    #[test]
    fn test_schema_fragment_primitives() {
        let fragment = schema_fragment(&int_cast());
        assert_eq!(fragment["type"], "integer");
        assert_eq!(fragment["description"], "Parse as integer");

        let def = CastDef::new("as_set", None, CastKind::StringSet, "Keywords");
        let fragment = schema_fragment(&def);
        assert_eq!(fragment["type"], "array");
        assert_eq!(fragment["items"]["type"], "string");
        assert_eq!(fragment["uniqueItems"], true);
    }

    #[test]
    fn test_schema_fragment_choice_cardinalities() {
        let fragment = schema_fragment(&choice_cast(false, false));
        assert_eq!(fragment["type"], "string");
        assert_eq!(fragment["enum"][0], "red");

        let fragment = schema_fragment(&choice_cast(true, false));
        assert!(fragment.get("anyOf").is_some());

        let fragment = schema_fragment(&choice_cast(false, true));
        assert_eq!(fragment["type"], "array");
        assert_eq!(fragment["minItems"], 1);

        let fragment = schema_fragment(&choice_cast(true, true));
        assert_eq!(fragment["type"], "array");
        assert!(fragment.get("minItems").is_none());
    }
}
