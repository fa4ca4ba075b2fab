//! Error types surfaced to the transport collaborator.

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    #[error("request failed with status {0}")]
    Status(u16),
    /// The request never produced a response (connection refused, aborted, offline).
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}
