use crate::blob::{NewBlob, StoredBlob};
use crate::error::Result;
use crate::key::EntryKey;
use crate::kind::Kind;
use crate::metadata::MetadataRecord;
use async_trait::async_trait;

/// Content handed to a store on creation.
#[derive(Debug, Clone, PartialEq)]
pub enum NewContent {
    /// A link target or text body.
    Value(String),
    Blob(NewBlob),
}

/// Content read back from a store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredContent {
    Record(MetadataRecord),
    Blob(StoredBlob),
}

/// The single capability the create and resolve paths depend on.
///
/// Implementations route each call to the backend selected by
/// [`Kind::backend`], so callers never name a concrete store.
#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Writes a new entry. Returns `Err(Conflict)` if the key is taken.
    async fn insert_or_put(&self, kind: Kind, key: &EntryKey, content: NewContent) -> Result<()>;

    /// Reads an entry. Returns `None` if nothing is stored under the key for that kind.
    async fn fetch(&self, kind: Kind, key: &EntryKey) -> Result<Option<StoredContent>>;
}
