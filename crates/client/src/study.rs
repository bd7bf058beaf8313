//! Studies: the aggregate that defines annotation types.

use biobank_core::{AnnotationType, CoreError};
use serde::Deserialize;

use crate::api::RestTransport;
use crate::error::ClientError;

/// A research study. Studies own the [`AnnotationType`] definitions that
/// apply to their participants and collection events; the annotation
/// layer treats those definitions as read-only.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: String,
    pub slug: String,
    pub version: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub annotation_types: Vec<AnnotationType>,
}

impl Study {
    /// Build a study from a server reply, validating each annotation
    /// type definition against its expected shape.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ClientError> {
        if let Some(types) = value.get("annotationTypes").and_then(|v| v.as_array()) {
            for raw_type in types {
                AnnotationType::from_json(raw_type)?;
            }
        }

        let study: Study = serde_json::from_value(value.clone()).map_err(|e| {
            tracing::error!("invalid study from server: {e}");
            ClientError::Core(CoreError::Validation(format!(
                "invalid study from server: {e}"
            )))
        })?;
        Ok(study)
    }

    /// Fetch a study by slug.
    pub async fn get(api: &dyn RestTransport, slug: &str) -> Result<Self, ClientError> {
        let reply = api.get(&format!("studies/{slug}")).await?;
        Self::from_json(&reply)
    }

    /// Find one of this study's annotation type definitions by id.
    pub fn annotation_type(&self, annotation_type_id: &str) -> Option<&AnnotationType> {
        self.annotation_types
            .iter()
            .find(|t| t.id == annotation_type_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
