use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised while parsing the core value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown kind: {0}")]
    UnknownKind(String),
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("invalid extension: {0}")]
    InvalidExtension(String),
}

/// Errors reported by a metadata or blob store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("entry already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage io failed: {0}")]
    Io(String),
    #[error("content does not match the backend for {0}")]
    Mismatch(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// How a failure is presented to the caller.
///
/// Transports map these onto their own status codes (400 / 404 / 500 for HTTP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Internal,
}
