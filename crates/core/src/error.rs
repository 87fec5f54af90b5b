use crate::types::DbId;
use crate::validator::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    FailedValidation(FieldErrors),

    /// The record changed between read and write; the caller may re-fetch and retry.
    #[error("Edit conflict: {entity} with id {id} was modified concurrently")]
    EditConflict { entity: &'static str, id: DbId },

    /// A caller broke an invariant that validation should already guarantee.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::FailedValidation(errors)
    }
}
