//! Annotation type definitions: the schema of a custom field.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::schema::{check_object, join_violations, FieldKind, FieldSpec, FieldViolation};
use crate::types::EntityId;
use crate::value_type::{AnnotationMaxValueCount, AnnotationValueType};

/// Expected shape of an annotation type payload from the server.
const ANNOTATION_TYPE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "id",
        kind: FieldKind::String,
        required: true,
    },
    FieldSpec {
        name: "slug",
        kind: FieldKind::String,
        required: true,
    },
    FieldSpec {
        name: "name",
        kind: FieldKind::String,
        required: true,
    },
    FieldSpec {
        name: "description",
        kind: FieldKind::NullableString,
        required: false,
    },
    FieldSpec {
        name: "valueType",
        kind: FieldKind::String,
        required: true,
    },
    FieldSpec {
        name: "maxValueCount",
        kind: FieldKind::NullableNumber,
        required: false,
    },
    FieldSpec {
        name: "options",
        kind: FieldKind::StringArray,
        required: false,
    },
    FieldSpec {
        name: "required",
        kind: FieldKind::Boolean,
        required: true,
    },
];

/// The definition of a custom field: its name, value kind, required-ness,
/// and (for Select kinds) the allowed option list.
///
/// Definitions are owned by a study and shared read-only with the
/// entities that carry values for them; the annotation layer never
/// mutates a definition it was handed. The editing mutators
/// ([`value_type_changed`](Self::value_type_changed),
/// [`add_option`](Self::add_option), [`remove_option`](Self::remove_option))
/// exist for the administration forms that build new definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationType {
    pub id: EntityId,
    pub slug: String,
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub value_type: AnnotationValueType,
    /// Number of choices allowed when `value_type` is Select: 1 restricts
    /// to a single choice, greater than 1 allows any number. Null or 0
    /// for every other value kind.
    #[serde(default)]
    pub max_value_count: Option<i64>,
    /// Allowed option labels; meaningful only for Select kinds. Labels
    /// are treated as a set for membership tests.
    #[serde(default)]
    pub options: Vec<String>,
    pub required: bool,
}

impl AnnotationType {
    /// Check a raw server payload against the expected field table,
    /// collecting every violation.
    pub fn schema_check(value: &serde_json::Value) -> Vec<FieldViolation> {
        let mut violations = check_object(value, ANNOTATION_TYPE_FIELDS);
        if let Some(s) = value.get("valueType").and_then(|v| v.as_str()) {
            if !AnnotationValueType::is_valid_str(s) {
                violations.push(FieldViolation {
                    field: "valueType",
                    message: format!("unknown value type '{s}'"),
                });
            }
        }
        violations
    }

    /// Build an annotation type from a server payload.
    ///
    /// Fails with a Validation error listing every field-level problem
    /// when the payload does not match the expected shape.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CoreError> {
        let violations = Self::schema_check(value);
        if !violations.is_empty() {
            return Err(CoreError::Validation(format!(
                "invalid annotation type from server: {}",
                join_violations(&violations)
            )));
        }

        let annotation_type: AnnotationType =
            serde_json::from_value(value.clone()).map_err(|e| {
                CoreError::Validation(format!("invalid annotation type from server: {e}"))
            })?;

        annotation_type
            .validate()
            .map_err(|e| CoreError::Validation(format!("invalid annotation type: {e}")))?;

        Ok(annotation_type)
    }

    // ---- value kind predicates ----

    pub fn is_value_type_text(&self) -> bool {
        self.value_type == AnnotationValueType::Text
    }

    pub fn is_value_type_number(&self) -> bool {
        self.value_type == AnnotationValueType::Number
    }

    pub fn is_value_type_date_time(&self) -> bool {
        self.value_type == AnnotationValueType::DateTime
    }

    pub fn is_value_type_select(&self) -> bool {
        self.value_type == AnnotationValueType::Select
    }

    /// Interpretation of the raw `max_value_count` integer, when it is
    /// present and interpretable.
    fn max_value_count_kind(&self) -> Option<AnnotationMaxValueCount> {
        self.max_value_count
            .and_then(|count| AnnotationMaxValueCount::from_count(count).ok())
    }

    /// True when this is a Select type restricted to a single choice.
    pub fn is_single_select(&self) -> bool {
        self.is_value_type_select()
            && self.max_value_count_kind() == Some(AnnotationMaxValueCount::SingleSelect)
    }

    /// True when this is a Select type allowing any number of choices.
    pub fn is_multiple_select(&self) -> bool {
        self.is_value_type_select()
            && self.max_value_count_kind() == Some(AnnotationMaxValueCount::MultipleSelect)
    }

    /// True when `max_value_count` is consistent with the value kind:
    /// Select types must be single- or multiple-select, every other kind
    /// must have a null or zero count.
    pub fn is_max_value_count_valid(&self) -> bool {
        if self.is_value_type_select() {
            self.is_single_select() || self.is_multiple_select()
        } else {
            matches!(self.max_value_count, None | Some(0))
        }
    }

    // ---- editing mutators ----

    /// Re-establish the max-value-count invariant after the caller has
    /// changed `value_type`. Moving away from Select clears the count;
    /// the option list is reset in every case.
    pub fn value_type_changed(&mut self) {
        if !self.is_value_type_select() {
            self.max_value_count = None;
        }
        self.options.clear();
    }

    /// Append an empty placeholder option for the editing form to fill in.
    pub fn add_option(&mut self) -> Result<(), CoreError> {
        if !self.is_value_type_select() {
            return Err(CoreError::Domain(format!(
                "value type is not select: {}",
                self.value_type.as_str()
            )));
        }
        self.options.push(String::new());
        Ok(())
    }

    /// Remove the option at `index`. A Select type must keep at least one
    /// option.
    pub fn remove_option(&mut self, index: usize) -> Result<(), CoreError> {
        if self.options.len() <= 1 {
            return Err(CoreError::Domain(
                "options is empty, cannot remove any more options".to_string(),
            ));
        }
        if index >= self.options.len() {
            return Err(CoreError::Domain(format!(
                "option index out of range: {index}"
            )));
        }
        self.options.remove(index);
        Ok(())
    }

    /// True when every candidate is one of this type's allowed options.
    pub fn valid_options<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        candidates
            .iter()
            .all(|candidate| self.options.iter().any(|o| o == candidate.as_ref()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
