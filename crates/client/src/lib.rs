//! REST client for the biobank backend.
//!
//! Wraps the backend's JSON API behind a [`RestTransport`] trait and
//! provides the host entities (studies, participants, collection events)
//! that carry annotations, pairing them with the annotation type
//! definitions their owning study supplies.
//!
//! Every network operation is an `async fn` returning `Result`; errors
//! from the server propagate untouched (no retry, no backoff). Writes
//! rebuild the entity from the server's reply rather than patching local
//! state.

pub mod api;
pub mod collection_event;
pub mod error;
pub mod has_annotations;
pub mod participant;
pub mod study;

pub use api::{ApiError, BiobankApi, RestTransport};
pub use collection_event::CollectionEvent;
pub use error::ClientError;
pub use has_annotations::HasAnnotations;
pub use participant::Participant;
pub use study::Study;
