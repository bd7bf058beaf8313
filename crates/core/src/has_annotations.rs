//! Pairing and precondition helpers for entities that carry annotations.
//!
//! Host entities (participants, collection events, specimens) own a list
//! of [`Annotation`]s built from the raw values the server returned and
//! the [`AnnotationType`] definitions supplied by the owning study.
//! These are free functions taking the host's lists as parameters, so
//! hosts compose them instead of inheriting behaviour.

use crate::annotation::{Annotation, ServerAnnotation};
use crate::annotation_type::AnnotationType;
use crate::error::CoreError;

/// Pair raw annotation values with their type definitions, producing one
/// typed [`Annotation`] per definition.
///
/// Every type is represented in the output even when the host has no
/// value for it yet (the output length equals `annotation_types`
/// length). A raw value whose type id matches none of the definitions
/// is a Validation error.
pub fn annotations_from_types(
    raw: &[ServerAnnotation],
    annotation_types: &[AnnotationType],
) -> Result<Vec<Annotation>, CoreError> {
    for value in raw {
        if !annotation_types
            .iter()
            .any(|t| t.id == value.annotation_type_id)
        {
            return Err(CoreError::Validation(format!(
                "no annotation type found for annotation with type id '{}'",
                value.annotation_type_id
            )));
        }
    }

    annotation_types
        .iter()
        .map(|annotation_type| {
            match raw
                .iter()
                .find(|value| value.annotation_type_id == annotation_type.id)
            {
                Some(value) => Annotation::from_server(value, annotation_type),
                None => Ok(Annotation::empty(annotation_type)),
            }
        })
        .collect()
}

/// Find the annotation bound to the given type id.
pub fn find_annotation<'a>(
    annotations: &'a [Annotation],
    annotation_type_id: &str,
) -> Option<&'a Annotation> {
    annotations
        .iter()
        .find(|annotation| annotation.annotation_type_id() == annotation_type_id)
}

/// Precondition for removing an annotation from a host: its type must be
/// part of the host's current set. Checked locally, before any network
/// call.
pub fn ensure_annotation_removable(
    annotations: &[Annotation],
    annotation: &Annotation,
) -> Result<(), CoreError> {
    if find_annotation(annotations, annotation.annotation_type_id()).is_none() {
        return Err(CoreError::Domain(format!(
            "annotation type with ID not present: {}",
            annotation.annotation_type_id()
        )));
    }
    Ok(())
}

/// Serialize a host's annotations for a save request, rejecting the
/// request locally when any annotation's value does not satisfy its
/// type.
pub fn server_payload(annotations: &[Annotation]) -> Result<Vec<ServerAnnotation>, CoreError> {
    for annotation in annotations {
        if !annotation.is_value_valid() {
            return Err(CoreError::Domain(format!(
                "required annotation has no value: annotation type id {}",
                annotation.annotation_type_id()
            )));
        }
    }
    Ok(annotations.iter().map(Annotation::to_server).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
