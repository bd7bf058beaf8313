//! Participants: the subjects specimens are collected from.

use biobank_core::{has_annotations, Annotation, AnnotationType, CoreError, ServerAnnotation};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::RestTransport;
use crate::error::ClientError;
use crate::has_annotations::HasAnnotations;
use crate::study::Study;

/// The subject a set of specimens was collected from; human or
/// otherwise. A participant belongs to a single [`Study`], which defines
/// the annotation types applicable to it.
#[derive(Debug, Clone, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub slug: String,
    pub version: i64,
    /// Identifier the participant is known by in the system, distinct
    /// from the domain-model `id`.
    #[validate(length(min = 1, message = "uniqueId cannot be empty"))]
    pub unique_id: String,
    pub study_id: String,
    /// Raw annotation values as returned by the server. Typed via
    /// [`set_annotation_types`](Self::set_annotation_types).
    #[serde(default, rename = "annotations")]
    raw_annotations: Vec<ServerAnnotation>,
    #[serde(skip)]
    annotations: Vec<Annotation>,
}

impl Participant {
    /// Build a participant from a server reply. Annotations stay raw
    /// until the study's type definitions are supplied.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ClientError> {
        let participant: Participant = serde_json::from_value(value.clone()).map_err(|e| {
            tracing::error!("invalid participant from server: {e}");
            ClientError::Core(CoreError::Validation(format!(
                "invalid participant from server: {e}"
            )))
        })?;
        Ok(participant)
    }

    /// A new, unpersisted participant for `study`, with one empty
    /// annotation per type the study defines.
    pub fn new(study: &Study, unique_id: impl Into<String>) -> Result<Self, ClientError> {
        let mut participant = Participant {
            id: String::new(),
            slug: String::new(),
            version: 0,
            unique_id: unique_id.into(),
            study_id: study.id.clone(),
            raw_annotations: Vec::new(),
            annotations: Vec::new(),
        };
        participant
            .validate()
            .map_err(|e| CoreError::Validation(format!("invalid participant: {e}")))?;
        participant.set_annotation_types(&study.annotation_types)?;
        Ok(participant)
    }

    /// Pair this participant's raw annotation values with the study's
    /// type definitions, replacing the typed annotation list. One
    /// annotation per type, unanswered types included.
    pub fn set_annotation_types(
        &mut self,
        annotation_types: &[AnnotationType],
    ) -> Result<(), CoreError> {
        self.annotations =
            has_annotations::annotations_from_types(&self.raw_annotations, annotation_types)?;
        Ok(())
    }

    /// Typed annotations, empty until
    /// [`set_annotation_types`](Self::set_annotation_types) runs.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Find the annotation bound to the given type id.
    pub fn annotation(&self, annotation_type_id: &str) -> Option<&Annotation> {
        has_annotations::find_annotation(&self.annotations, annotation_type_id)
    }

    /// Mutable access for a form editing one annotation's value.
    pub fn annotation_mut(&mut self, annotation_type_id: &str) -> Option<&mut Annotation> {
        self.annotations
            .iter_mut()
            .find(|a| a.annotation_type_id() == annotation_type_id)
    }

    /// Fetch a participant by slug.
    pub async fn get(api: &dyn RestTransport, slug: &str) -> Result<Self, ClientError> {
        let reply = api.get(&format!("participants/{slug}")).await?;
        Self::from_json(&reply)
    }

    /// Persist a new participant. Rejects locally, before any request,
    /// when a required annotation has no value.
    pub async fn add(&self, api: &dyn RestTransport) -> Result<Self, ClientError> {
        let annotations = has_annotations::server_payload(&self.annotations)?;
        let body = json!({
            "uniqueId": self.unique_id,
            "annotations": annotations,
        });
        let reply = api
            .post(&format!("participants/{}", self.study_id), &body)
            .await?;
        Self::from_json(&reply)
    }

    /// Update the participant's unique identifier.
    pub async fn update_unique_id(
        &self,
        api: &dyn RestTransport,
        unique_id: &str,
    ) -> Result<Self, ClientError> {
        let body = json!({
            "expectedVersion": self.version,
            "uniqueId": unique_id,
        });
        let reply = api
            .post(&format!("participants/uniqueId/{}", self.id), &body)
            .await?;
        Self::from_json(&reply)
    }
}

impl HasAnnotations for Participant {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn update_annotation_path(&self) -> String {
        format!("participants/annot/{}", self.id)
    }

    fn remove_annotation_path(&self, annotation_type_id: &str) -> String {
        format!(
            "participants/annot/{}/{}/{}",
            self.id, self.version, annotation_type_id
        )
    }

    fn from_server_json(value: &serde_json::Value) -> Result<Self, ClientError> {
        Self::from_json(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
