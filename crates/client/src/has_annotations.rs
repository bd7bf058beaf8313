//! Annotation add/remove round-trips shared by host entities.

use async_trait::async_trait;
use biobank_core::{has_annotations, Annotation};
use serde_json::json;

use crate::api::RestTransport;
use crate::error::ClientError;

/// Capability for entities whose annotations are persisted on the
/// server.
///
/// Implementors supply accessors and the REST paths for their
/// annotation endpoints; the provided methods run the precondition
/// checks, issue the request, and rebuild the entity from the server's
/// reply. The rebuild is a full replace — the server is the source of
/// truth, and local state is never patched optimistically.
///
/// Concurrent mutations on the same entity are not serialized here; the
/// last reply to arrive wins. Callers needing stronger ordering must
/// sequence their requests.
#[async_trait]
pub trait HasAnnotations: Sized + Send + Sync {
    /// Typed annotations currently held by this entity.
    fn annotations(&self) -> &[Annotation];

    /// Version the server expects for optimistic-concurrency checks.
    fn version(&self) -> i64;

    /// Endpoint path for adding or updating one annotation.
    fn update_annotation_path(&self) -> String;

    /// Endpoint path for removing the annotation with the given type id.
    fn remove_annotation_path(&self, annotation_type_id: &str) -> String;

    /// Rebuild the entity from a server reply.
    fn from_server_json(value: &serde_json::Value) -> Result<Self, ClientError>;

    /// Persist `annotation`, returning the freshly reconstructed entity.
    async fn add_annotation(
        &self,
        api: &dyn RestTransport,
        annotation: &Annotation,
    ) -> Result<Self, ClientError> {
        let server = annotation.to_server();
        let body = json!({
            "expectedVersion": self.version(),
            "annotationTypeId": server.annotation_type_id,
            "stringValue": server.string_value,
            "selectedValues": server.selected_values,
        });
        let reply = api.post(&self.update_annotation_path(), &body).await?;
        Self::from_server_json(&reply)
    }

    /// Remove `annotation` on the server, returning the reconstructed
    /// entity. Fails with a Domain error before any network call when
    /// the annotation's type is not in this entity's current set.
    async fn remove_annotation(
        &self,
        api: &dyn RestTransport,
        annotation: &Annotation,
    ) -> Result<Self, ClientError> {
        has_annotations::ensure_annotation_removable(self.annotations(), annotation)?;
        let reply = api
            .delete(&self.remove_annotation_path(annotation.annotation_type_id()))
            .await?;
        Self::from_server_json(&reply)
    }
}
