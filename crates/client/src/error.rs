use biobank_core::CoreError;

use crate::api::ApiError;

/// Errors surfaced by host-entity REST operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Domain or validation failure from the annotation model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transport or server failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}
