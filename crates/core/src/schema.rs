//! Field-level shape checks for JSON payloads received from the server.
//!
//! A payload is checked against a declarative field table before serde
//! deserialization, so callers get every violation at once with the
//! field name attached instead of a single opaque decode error.

use serde_json::Value;

/// Expected primitive shape of a JSON field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// String or null.
    NullableString,
    /// Number or null.
    NullableNumber,
    Boolean,
    /// Array whose elements are all strings.
    StringArray,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::NullableString => value.is_string() || value.is_null(),
            Self::NullableNumber => value.is_number() || value.is_null(),
            Self::Boolean => value.is_boolean(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::NullableString => "a string or null",
            Self::NullableNumber => "a number or null",
            Self::Boolean => "a boolean",
            Self::StringArray => "an array of strings",
        }
    }
}

/// Declarative description of one field in a wire object.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Required fields must be present and non-null.
    pub required: bool,
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Check `value` against the field table, collecting every violation.
///
/// Unknown fields are ignored; the server is free to add fields the
/// client does not know about yet.
pub fn check_object(value: &Value, fields: &[FieldSpec]) -> Vec<FieldViolation> {
    let Some(obj) = value.as_object() else {
        return vec![FieldViolation {
            field: "",
            message: "payload must be a JSON object".to_string(),
        }];
    };

    let mut violations = Vec::new();
    for spec in fields {
        match obj.get(spec.name) {
            None => {
                if spec.required {
                    violations.push(FieldViolation {
                        field: spec.name,
                        message: "missing required field".to_string(),
                    });
                }
            }
            Some(field_value) => {
                if !spec.kind.matches(field_value) {
                    violations.push(FieldViolation {
                        field: spec.name,
                        message: format!("must be {}", spec.kind.describe()),
                    });
                }
            }
        }
    }
    violations
}

/// Join violations into one human-readable message.
pub fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| {
            if v.field.is_empty() {
                v.message.clone()
            } else {
                format!("{}: {}", v.field, v.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
