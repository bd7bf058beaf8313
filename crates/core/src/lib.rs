//! Biobank annotation domain model.
//!
//! Provides the value-kind enumerations, annotation type definitions,
//! typed annotation values, and the pairing/precondition helpers used by
//! host entities (participants, collection events, specimens) that carry
//! custom-field annotations defined by their owning study.
//!
//! This crate is pure and synchronous: no I/O, no logging, no async. The
//! REST round-trips that persist annotations live in `biobank-client`.

pub mod annotation;
pub mod annotation_type;
pub mod error;
pub mod has_annotations;
pub mod schema;
pub mod types;
pub mod value_type;

pub use annotation::{Annotation, AnnotationValue, ServerAnnotation};
pub use annotation_type::AnnotationType;
pub use error::CoreError;
pub use value_type::{AnnotationMaxValueCount, AnnotationValueType};
