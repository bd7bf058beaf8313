/// Errors raised by the annotation domain model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Schema or shape problem on data received from the server or
    /// constructed locally. Fatal to that construction attempt.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business-rule violation: an invalid mutation or a failed
    /// precondition. Indicates a caller bug, never a transient condition.
    #[error("Domain rule violated: {0}")]
    Domain(String),
}
