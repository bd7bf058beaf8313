//! Typed annotation values and their wire representation.
//!
//! An [`Annotation`] binds a value to an [`AnnotationType`]. The four
//! value kinds are a closed variant set ([`AnnotationValue`]); dispatch
//! happens by matching on the variant, and the set of kinds is checked
//! exhaustively at compile time. Construction goes through
//! [`Annotation::from_server`] or [`Annotation::empty`], which pick the
//! variant from the type's value kind.

use std::collections::BTreeSet;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::annotation_type::AnnotationType;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::value_type::AnnotationValueType;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// The wire format the backend accepts and returns for one annotation.
///
/// Both slots are always present; exactly one is meaningfully populated.
/// Text, Number, and DateTime kinds serialize into `string_value` (empty
/// string when unset); Select kinds serialize into `selected_values`
/// (empty array when unset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerAnnotation {
    pub annotation_type_id: EntityId,
    #[serde(default)]
    pub string_value: String,
    #[serde(default)]
    pub selected_values: Vec<String>,
}

// ---------------------------------------------------------------------------
// Value variants
// ---------------------------------------------------------------------------

/// The in-memory value of an annotation, one variant per value kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Text(String),
    Number(Option<f64>),
    DateTime(Option<Timestamp>),
    /// Selected option labels, a subset of the type's option list.
    Select(BTreeSet<String>),
}

impl AnnotationValue {
    /// The value kind this variant corresponds to.
    pub fn value_type(&self) -> AnnotationValueType {
        match self {
            Self::Text(_) => AnnotationValueType::Text,
            Self::Number(_) => AnnotationValueType::Number,
            Self::DateTime(_) => AnnotationValueType::DateTime,
            Self::Select(_) => AnnotationValueType::Select,
        }
    }

    /// True when no value has been entered.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Number(n) => n.is_none(),
            Self::DateTime(d) => d.is_none(),
            Self::Select(chosen) => chosen.is_empty(),
        }
    }

    fn empty_for(value_type: AnnotationValueType) -> Self {
        match value_type {
            AnnotationValueType::Text => Self::Text(String::new()),
            AnnotationValueType::Number => Self::Number(None),
            AnnotationValueType::DateTime => Self::DateTime(None),
            AnnotationValueType::Select => Self::Select(BTreeSet::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A value entered for one custom field, bound to the [`AnnotationType`]
/// that defines the field.
///
/// The type is a read-only copy; the annotation layer never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    annotation_type: AnnotationType,
    value: AnnotationValue,
}

impl Annotation {
    /// A fresh annotation with no value, for a form beginning to edit a
    /// field the host has not answered yet.
    pub fn empty(annotation_type: &AnnotationType) -> Self {
        Self {
            annotation_type: annotation_type.clone(),
            value: AnnotationValue::empty_for(annotation_type.value_type),
        }
    }

    /// Build an annotation from its wire value and its type definition.
    ///
    /// The variant is chosen from the type's value kind. Unparseable
    /// numeric or date-time strings and a type-id mismatch are Validation
    /// errors. Selected values outside the type's option list construct
    /// successfully and fail [`is_value_valid`](Self::is_value_valid).
    pub fn from_server(
        raw: &ServerAnnotation,
        annotation_type: &AnnotationType,
    ) -> Result<Self, CoreError> {
        if raw.annotation_type_id != annotation_type.id {
            return Err(CoreError::Validation(format!(
                "annotation type id mismatch: annotation has '{}', type is '{}'",
                raw.annotation_type_id, annotation_type.id
            )));
        }

        let value = match annotation_type.value_type {
            AnnotationValueType::Text => AnnotationValue::Text(raw.string_value.clone()),
            AnnotationValueType::Number => AnnotationValue::Number(parse_number(&raw.string_value)?),
            AnnotationValueType::DateTime => {
                AnnotationValue::DateTime(parse_date_time(&raw.string_value)?)
            }
            AnnotationValueType::Select => {
                AnnotationValue::Select(raw.selected_values.iter().cloned().collect())
            }
        };

        Ok(Self {
            annotation_type: annotation_type.clone(),
            value,
        })
    }

    // ---- accessors ----

    pub fn annotation_type(&self) -> &AnnotationType {
        &self.annotation_type
    }

    pub fn annotation_type_id(&self) -> &str {
        &self.annotation_type.id
    }

    pub fn value(&self) -> &AnnotationValue {
        &self.value
    }

    pub fn value_type(&self) -> AnnotationValueType {
        self.annotation_type.value_type
    }

    /// The text value, when this is a Text annotation.
    pub fn text_value(&self) -> Option<&str> {
        match &self.value {
            AnnotationValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, when this is a Number annotation with a value.
    pub fn number_value(&self) -> Option<f64> {
        match self.value {
            AnnotationValue::Number(n) => n,
            _ => None,
        }
    }

    /// The date-time value, when this is a DateTime annotation with a
    /// value.
    pub fn date_time_value(&self) -> Option<Timestamp> {
        match self.value {
            AnnotationValue::DateTime(d) => d,
            _ => None,
        }
    }

    /// The chosen option labels, when this is a Select annotation.
    pub fn selected_values(&self) -> Option<&BTreeSet<String>> {
        match &self.value {
            AnnotationValue::Select(chosen) => Some(chosen),
            _ => None,
        }
    }

    /// Display representation of the value, or `None` when unset.
    /// Date-times format as `YYYY-MM-DD HH:MM`; select values join with
    /// a comma.
    pub fn display_value(&self) -> Option<String> {
        match &self.value {
            AnnotationValue::Text(s) => {
                if s.is_empty() {
                    None
                } else {
                    Some(s.clone())
                }
            }
            AnnotationValue::Number(n) => n.map(format_number),
            AnnotationValue::DateTime(d) => {
                d.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            }
            AnnotationValue::Select(chosen) => {
                if chosen.is_empty() {
                    None
                } else {
                    Some(
                        chosen
                            .iter()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", "),
                    )
                }
            }
        }
    }

    // ---- mutators ----

    fn expect_kind(&self, expected: AnnotationValueType) -> Result<(), CoreError> {
        if self.value_type() != expected {
            return Err(CoreError::Domain(format!(
                "value kind mismatch: annotation is {}, not {}",
                self.value_type().as_str(),
                expected.as_str()
            )));
        }
        Ok(())
    }

    /// Set the value of a Text annotation.
    pub fn set_text(&mut self, value: impl Into<String>) -> Result<(), CoreError> {
        self.expect_kind(AnnotationValueType::Text)?;
        self.value = AnnotationValue::Text(value.into());
        Ok(())
    }

    /// Set the value of a Number annotation.
    pub fn set_number(&mut self, value: Option<f64>) -> Result<(), CoreError> {
        self.expect_kind(AnnotationValueType::Number)?;
        self.value = AnnotationValue::Number(value);
        Ok(())
    }

    /// Set the value of a DateTime annotation.
    pub fn set_date_time(&mut self, value: Option<Timestamp>) -> Result<(), CoreError> {
        self.expect_kind(AnnotationValueType::DateTime)?;
        self.value = AnnotationValue::DateTime(value);
        Ok(())
    }

    /// Set the value of a DateTime annotation from a string. Accepts
    /// RFC 3339 or `YYYY-MM-DD HH:MM` (read as UTC); an empty string
    /// clears the value.
    pub fn set_date_time_str(&mut self, value: &str) -> Result<(), CoreError> {
        self.expect_kind(AnnotationValueType::DateTime)?;
        self.value = AnnotationValue::DateTime(parse_date_time(value)?);
        Ok(())
    }

    /// Replace the chosen options of a Select annotation.
    pub fn set_selected<I, S>(&mut self, values: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expect_kind(AnnotationValueType::Select)?;
        self.value = AnnotationValue::Select(values.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Choose one option. Single-select types replace the current
    /// choice; multiple-select types add to it.
    pub fn select(&mut self, label: impl Into<String>) -> Result<(), CoreError> {
        self.expect_kind(AnnotationValueType::Select)?;
        let single = self.annotation_type.is_single_select();
        if let AnnotationValue::Select(chosen) = &mut self.value {
            if single {
                chosen.clear();
            }
            chosen.insert(label.into());
        }
        Ok(())
    }

    /// Withdraw one chosen option.
    pub fn deselect(&mut self, label: &str) -> Result<(), CoreError> {
        self.expect_kind(AnnotationValueType::Select)?;
        if let AnnotationValue::Select(chosen) = &mut self.value {
            chosen.remove(label);
        }
        Ok(())
    }

    /// Clear the value, whatever the kind.
    pub fn clear(&mut self) {
        self.value = AnnotationValue::empty_for(self.value_type());
    }

    // ---- validation and serialization ----

    /// True when the value satisfies the type: required types must have
    /// a value, and Select values must be a subset of the type's option
    /// list whether required or not.
    pub fn is_value_valid(&self) -> bool {
        if let AnnotationValue::Select(chosen) = &self.value {
            let labels: Vec<&str> = chosen.iter().map(String::as_str).collect();
            if !self.annotation_type.valid_options(&labels) {
                return false;
            }
        }
        if self.annotation_type.required && self.value.is_empty() {
            return false;
        }
        true
    }

    /// Serialize into the wire format the backend accepts. Every variant
    /// fills exactly one slot; the other is an empty placeholder.
    pub fn to_server(&self) -> ServerAnnotation {
        let (string_value, selected_values) = match &self.value {
            AnnotationValue::Text(s) => (s.clone(), Vec::new()),
            AnnotationValue::Number(n) => {
                (n.map(format_number).unwrap_or_default(), Vec::new())
            }
            AnnotationValue::DateTime(d) => {
                (d.map(format_date_time).unwrap_or_default(), Vec::new())
            }
            AnnotationValue::Select(chosen) => {
                (String::new(), chosen.iter().cloned().collect())
            }
        };

        ServerAnnotation {
            annotation_type_id: self.annotation_type.id.clone(),
            string_value,
            selected_values,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing and formatting helpers
// ---------------------------------------------------------------------------

fn parse_number(raw: &str) -> Result<Option<f64>, CoreError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        CoreError::Validation(format!("invalid numeric annotation value: '{raw}'"))
    })
}

fn format_number(value: f64) -> String {
    value.to_string()
}

fn parse_date_time(raw: &str) -> Result<Option<Timestamp>, CoreError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&chrono::Utc)));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Ok(Some(naive.and_utc()));
    }
    Err(CoreError::Validation(format!(
        "invalid date-time annotation value: '{raw}'"
    )))
}

fn format_date_time(value: Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
