//! Collection events: one specimen-collecting visit by a participant.

use biobank_core::types::Timestamp;
use biobank_core::{has_annotations, Annotation, AnnotationType, CoreError, ServerAnnotation};
use serde::Deserialize;
use serde_json::json;

use crate::api::RestTransport;
use crate::error::ClientError;
use crate::has_annotations::HasAnnotations;

/// A visit during which specimens were collected from a participant.
/// The applicable annotation types come from the event's collection
/// event type, defined by the owning study.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEvent {
    pub id: String,
    pub slug: String,
    pub version: i64,
    pub participant_id: String,
    pub collection_event_type_id: String,
    pub visit_number: i64,
    #[serde(default)]
    pub time_completed: Option<Timestamp>,
    /// Raw annotation values as returned by the server. Typed via
    /// [`set_annotation_types`](Self::set_annotation_types).
    #[serde(default, rename = "annotations")]
    raw_annotations: Vec<ServerAnnotation>,
    #[serde(skip)]
    annotations: Vec<Annotation>,
}

impl CollectionEvent {
    /// Build a collection event from a server reply. Annotations stay
    /// raw until the event type's definitions are supplied.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ClientError> {
        let event: CollectionEvent = serde_json::from_value(value.clone()).map_err(|e| {
            tracing::error!("invalid collection event from server: {e}");
            ClientError::Core(CoreError::Validation(format!(
                "invalid collection event from server: {e}"
            )))
        })?;
        Ok(event)
    }

    /// Pair this event's raw annotation values with its event type's
    /// definitions, replacing the typed annotation list.
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

    /// Fetch a collection event by slug.
    pub async fn get(api: &dyn RestTransport, slug: &str) -> Result<Self, ClientError> {
        let reply = api.get(&format!("participants/cevents/{slug}")).await?;
        Self::from_json(&reply)
    }

    /// Persist a new collection event. Rejects locally, before any
    /// request, when a required annotation has no value.
    pub async fn add(&self, api: &dyn RestTransport) -> Result<Self, ClientError> {
        let annotations = has_annotations::server_payload(&self.annotations)?;
        let body = json!({
            "collectionEventTypeId": self.collection_event_type_id,
            "visitNumber": self.visit_number,
            "timeCompleted": self.time_completed,
            "annotations": annotations,
        });
        let reply = api
            .post(&format!("participants/cevents/{}", self.participant_id), &body)
            .await?;
        Self::from_json(&reply)
    }
}

impl HasAnnotations for CollectionEvent {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn update_annotation_path(&self) -> String {
        format!("participants/cevents/annot/{}", self.id)
    }

    fn remove_annotation_path(&self, annotation_type_id: &str) -> String {
        format!(
            "participants/cevents/annot/{}/{}/{}",
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
