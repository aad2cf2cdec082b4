use keyhole_core::{CoreError, ErrorClass, StorageError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CreateError {
    #[error("invalid kind: {0}")]
    InvalidKind(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("storage operation failed: {0}")]
    StoreUnavailable(#[source] StorageError),
}

impl CreateError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CreateError::InvalidKind(_) | CreateError::InvalidPayload(_) => ErrorClass::BadRequest,
            CreateError::StoreUnavailable(_) => ErrorClass::Internal,
        }
    }
}

impl From<CoreError> for CreateError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::UnknownKind(kind) => Self::InvalidKind(kind),
            other => Self::InvalidPayload(other.to_string()),
        }
    }
}

impl From<StorageError> for CreateError {
    fn from(value: StorageError) -> Self {
        Self::StoreUnavailable(value)
    }
}
