//! Backend-agnostic failure type shared by every ranking store.

use std::error::Error;
use thiserror::Error;

/// Result alias for ranking store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Store failure surfaced to callers whatever engine sits underneath.
///
/// Failures are structural (bad path, corrupted file, full disk) so nothing in
/// the crate retries them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend failed while serving a request.
    #[error("{backend} ranking store unavailable: {message}")]
    Unavailable {
        backend: &'static str,
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The configured backend was not compiled into this build.
    #[error("{backend} ranking store is not enabled in this build")]
    Unsupported { backend: &'static str },
}

impl StorageError {
    /// Wrap a backend failure.
    pub fn unavailable(
        backend: &'static str,
        message: String,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            backend,
            message,
            source: Box::new(source),
        }
    }

    /// Name of the backend that produced the failure.
    pub fn backend(&self) -> &'static str {
        match self {
            StorageError::Unavailable { backend, .. } | StorageError::Unsupported { backend } => {
                backend
            }
        }
    }
}
