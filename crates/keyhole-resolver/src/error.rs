use keyhole_core::{ErrorClass, Kind, StorageError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("entry not found")]
    NotFound,
    /// The entry exists but is missing its payload or has the wrong shape.
    #[error("stored {kind} entry {id} is inconsistent")]
    Inconsistent { kind: Kind, id: String },
    #[error("storage operation failed: {0}")]
    StoreUnavailable(#[source] StorageError),
}

impl ResolveError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ResolveError::NotFound => ErrorClass::NotFound,
            ResolveError::Inconsistent { .. } | ResolveError::StoreUnavailable(_) => {
                ErrorClass::Internal
            }
        }
    }
}
