use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors that can occur in ranking service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A caller-supplied argument violated a precondition. Nothing was persisted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The ranking store failed while serving `operation`.
    #[error("{operation} failed: {} ranking store unavailable", .source.backend())]
    Unavailable {
        operation: &'static str,
        #[source]
        source: StorageError,
    },
    /// An identity that was just ensured to exist is missing from the ranking.
    #[error("identity `{identity}` vanished from the ranking during {operation}")]
    Inconsistent {
        operation: &'static str,
        identity: String,
    },
}

impl ServiceError {
    /// Adapter for `map_err` tagging a store failure with the failing operation.
    pub(crate) fn unavailable(operation: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| ServiceError::Unavailable { operation, source }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}
