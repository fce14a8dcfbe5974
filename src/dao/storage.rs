use std::error::Error;

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable summary of what failed.
        message: String,
        /// Backend-specific failure cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
