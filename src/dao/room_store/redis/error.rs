use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Result alias for the Redis REST backend.
pub type RedisResult<T> = Result<T, RedisDaoError>;

/// Errors specific to the Redis REST backend.
#[derive(Debug, Error)]
pub enum RedisDaoError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("request to `{path}` failed")]
    RequestSend {
        /// Command path that was requested.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("request to `{path}` returned status {status}")]
    RequestStatus {
        /// Command path that was requested.
        path: String,
        /// HTTP status returned by the endpoint.
        status: StatusCode,
    },
    /// The response envelope could not be decoded.
    #[error("failed to decode response from `{path}`")]
    DecodeResponse {
        /// Command path that was requested.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
}

impl From<RedisDaoError> for StorageError {
    fn from(err: RedisDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
