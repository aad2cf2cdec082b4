use crate::error::Result;
use crate::identifier::Identifier;
use crate::kind::Collection;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored link or text record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: Identifier,
    /// The link target or text content. A record without one is inconsistent.
    pub value: Option<String>,
    pub created_at: Timestamp,
}

/// Persists small structured records, one collection per metadata kind.
#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Inserts a new record. Returns `Err(Conflict)` if the id is already taken
    /// in that collection.
    async fn insert(&self, collection: Collection, id: &Identifier, value: &str) -> Result<()>;

    /// Retrieves a record. Returns `None` if the id does not exist in that collection.
    async fn fetch(&self, collection: Collection, id: &Identifier)
        -> Result<Option<MetadataRecord>>;
}
