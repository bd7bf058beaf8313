//! Value-kind enumerations for annotation types.
//!
//! Both enumerations are fixed, closed sets. They are plain types passed
//! where needed; there is no runtime registry.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// AnnotationValueType
// ---------------------------------------------------------------------------

/// The kind of value an annotation stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationValueType {
    Text,
    Number,
    DateTime,
    Select,
}

/// All valid value type strings, as they appear on the wire.
const VALID_VALUE_TYPE_STRINGS: &[&str] = &["Text", "Number", "DateTime", "Select"];

impl AnnotationValueType {
    /// Return the value type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number => "Number",
            Self::DateTime => "DateTime",
            Self::Select => "Select",
        }
    }

    /// Parse a value type from its wire string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "Text" => Ok(Self::Text),
            "Number" => Ok(Self::Number),
            "DateTime" => Ok(Self::DateTime),
            "Select" => Ok(Self::Select),
            _ => Err(CoreError::Validation(format!(
                "Invalid annotation value type '{s}'. Must be one of: {}",
                VALID_VALUE_TYPE_STRINGS.join(", ")
            ))),
        }
    }

    /// True when `s` is a known value type string.
    pub fn is_valid_str(s: &str) -> bool {
        VALID_VALUE_TYPE_STRINGS.contains(&s)
    }
}

// ---------------------------------------------------------------------------
// AnnotationMaxValueCount
// ---------------------------------------------------------------------------

/// How many options a Select annotation allows to be chosen.
///
/// Meaningful only when the value type is
/// [`Select`](AnnotationValueType::Select). The wire value is an integer
/// (or null); every count above 1 means any number of selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationMaxValueCount {
    None,
    SingleSelect,
    MultipleSelect,
}

impl AnnotationMaxValueCount {
    /// Interpret a wire `maxValueCount` integer.
    pub fn from_count(count: i64) -> Result<Self, CoreError> {
        match count {
            0 => Ok(Self::None),
            1 => Ok(Self::SingleSelect),
            n if n > 1 => Ok(Self::MultipleSelect),
            _ => Err(CoreError::Validation(format!(
                "Invalid maxValueCount {count}: must be zero or greater"
            ))),
        }
    }

    /// Canonical integer for this enumeration value.
    pub fn count(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::SingleSelect => 1,
            Self::MultipleSelect => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
