use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use keyhole_core::{BlobStore, NewBlob, Result, StorageError, StoredBlob};
use tracing::trace;

/// In-memory implementation of [`BlobStore`].
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: DashMap<String, StoredBlob>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, blob: NewBlob) -> Result<()> {
        match self.blobs.entry(path.to_string()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(path.to_string())),
            Entry::Vacant(slot) => {
                let sealed = slot.insert(StoredBlob::seal(blob));
                trace!(path, etag = %sealed.etag, size = sealed.body.len(), "stored blob");
                Ok(())
            }
        }
    }

    async fn get(&self, path: &str) -> Result<Option<StoredBlob>> {
        Ok(self.blobs.get(path).map(|blob| blob.value().clone()))
    }
}
