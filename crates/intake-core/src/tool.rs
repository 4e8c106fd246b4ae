//! Structured-update tool construction and application.
//!
//! One tool per interview carries the whole update surface: each currently
//! active field is an object argument holding the primary triplet (`value`,
//! `context`, `as_quote`) plus one entry per declared cast. Application is
//! atomic; a failure on any argument leaves the snapshot untouched and is
//! reported back to the model as an error tool result.

use intake_types::error::ApplyError;
use intake_types::field::{FieldDef, FieldValue, KEY_CONTEXT, KEY_QUOTE, KEY_VALUE, RESERVED_KEYS};
use intake_types::interview::Interview;
use intake_types::llm::ToolSpec;
use intake_types::message::ToolCall;

use crate::cast::{schema_fragment, validate_cast};
use crate::interview::InterviewExt;

/// Tool identifier for an interview's structured update.
///
/// The type name is reduced to `[A-Za-z0-9_]` to satisfy provider tool-name
/// constraints; runs of other characters collapse to one underscore.
pub fn tool_name(interview: &Interview) -> String {
    let cleaned: String = interview
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    // Collapse consecutive underscores and trim edges
    let mut result = String::with_capacity(cleaned.len());
    let mut prev_was_underscore = true; // treat start as underscore to trim leading
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_was_underscore {
                result.push('_');
            }
            prev_was_underscore = true;
        } else {
            result.push(c);
            prev_was_underscore = false;
        }
    }
    if result.ends_with('_') {
        result.pop();
    }

    format!("update_{result}")
}

/// Build the structured-update tool over the currently active fields.
///
/// Returns `None` when no field is active, in which case the model is not
/// offered a tool at all. Every cast appears in the per-field `required`
/// list so the model produces casts in the same update as the primary
/// value; application still tolerates their absence.
pub fn build_tool_spec(interview: &Interview) -> Option<ToolSpec> {
    let active = interview.active_fields();
    if active.is_empty() {
        return None;
    }

    let mut properties = serde_json::Map::new();
    for field in active {
        properties.insert(field.name.clone(), field_schema(field));
    }

    Some(ToolSpec {
        name: tool_name(interview),
        description: format!(
            "Record fields of {} ({}) once the conversation establishes them. \
            Supply only fields whose answer is now known.",
            interview.name, interview.description,
        ),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": properties,
        }),
    })
}

/// Apply one structured update to the snapshot.
///
/// Every supplied argument is validated first, then all are written; on any
/// error nothing is written. A `null` argument is skipped. Returns the names
/// of the fields written, in argument order.
pub fn apply_update(
    interview: &mut Interview,
    call: &ToolCall,
) -> Result<Vec<String>, ApplyError> {
    let expected = tool_name(interview);
    if call.name != expected {
        return Err(ApplyError::UnknownTool(call.name.clone()));
    }

    let args = call
        .arguments
        .as_object()
        .ok_or(ApplyError::MalformedArguments)?;

    let mut staged = Vec::with_capacity(args.len());
    for (name, raw) in args {
        if raw.is_null() {
            continue;
        }
        let field = interview
            .field(name)
            .ok_or_else(|| ApplyError::UnknownField(name.clone()))?;
        staged.push((name.clone(), validate_field_update(field, raw)?));
    }

    let mut updated = Vec::with_capacity(staged.len());
    for (name, value) in staged {
        if let Some(field) = interview.field_mut(&name) {
            field.value = Some(value);
            updated.push(name);
        }
    }

    Ok(updated)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn field_schema(field: &FieldDef) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        KEY_VALUE.to_string(),
        serde_json::json!({
            "type": "string",
            "description": "The answer, normalized to plain text",
        }),
    );
    properties.insert(
        KEY_CONTEXT.to_string(),
        serde_json::json!({
            "type": "string",
            "description": "How the conversation established this answer",
        }),
    );
    properties.insert(
        KEY_QUOTE.to_string(),
        serde_json::json!({
            "type": "string",
            "description": "Verbatim quote from the respondent supporting the answer",
        }),
    );

    let mut required: Vec<String> = RESERVED_KEYS.iter().map(|k| k.to_string()).collect();
    for cast in &field.casts {
        properties.insert(cast.name.clone(), schema_fragment(cast));
        required.push(cast.name.clone());
    }

    serde_json::json!({
        "type": "object",
        "description": field.description,
        "properties": properties,
        "required": required,
    })
}

fn validate_field_update(
    field: &FieldDef,
    raw: &serde_json::Value,
) -> Result<FieldValue, ApplyError> {
    let entries = raw.as_object().ok_or_else(|| ApplyError::MalformedField {
        field: field.name.clone(),
    })?;

    let primary = entries
        .get(KEY_VALUE)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApplyError::MissingValue {
            field: field.name.clone(),
        })?
        .as_str()
        .ok_or_else(|| wrong_entry(field, KEY_VALUE))?
        .to_string();

    let context = optional_text(field, entries, KEY_CONTEXT)?;
    let quote = optional_text(field, entries, KEY_QUOTE)?;

    let mut value = FieldValue::of(primary);
    value.context = context;
    value.quote = quote;

    for (key, entry) in entries {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let cast = field
            .cast_def(key)
            .ok_or_else(|| ApplyError::UnknownKey {
                field: field.name.clone(),
                key: key.clone(),
            })?;
        match validate_cast(cast, entry) {
            Ok(Some(cast_value)) => {
                value.casts.insert(key.clone(), cast_value);
            }
            Ok(None) => {}
            Err(source) => {
                return Err(ApplyError::Cast {
                    field: field.name.clone(),
                    source,
                });
            }
        }
    }

    Ok(value)
}

fn optional_text(
    field: &FieldDef,
    entries: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<String, ApplyError> {
    match entries.get(key) {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(entry) => entry
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_entry(field, key)),
    }
}

fn wrong_entry(field: &FieldDef, key: &str) -> ApplyError {
    ApplyError::WrongEntryType {
        field: field.name.clone(),
        key: key.to_string(),
        expected: "string".to_string(),
    }
}
