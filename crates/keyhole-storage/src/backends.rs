use async_trait::async_trait;
use keyhole_core::{
    Backend, BlobStore, ContentStore, EntryKey, Kind, MetadataStore, NewContent, Result,
    StorageError, StoredContent,
};
use std::sync::Arc;

/// Routes entries to a metadata store or a blob store by kind.
///
/// This is the one place that maps a [`Kind`] onto a concrete backend;
/// everything above it works against [`ContentStore`].
#[derive(Debug)]
pub struct Backends<M, B> {
    metadata: Arc<M>,
    blobs: Arc<B>,
}

impl<M, B> Clone for Backends<M, B> {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<M: MetadataStore, B: BlobStore> Backends<M, B> {
    pub fn new(metadata: M, blobs: B) -> Self {
        Self::from_shared(Arc::new(metadata), Arc::new(blobs))
    }

    /// Builds the dispatcher over stores that are also used elsewhere.
    pub fn from_shared(metadata: Arc<M>, blobs: Arc<B>) -> Self {
        Self { metadata, blobs }
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

#[async_trait]
impl<M: MetadataStore, B: BlobStore> ContentStore for Backends<M, B> {
    async fn insert_or_put(&self, kind: Kind, key: &EntryKey, content: NewContent) -> Result<()> {
        match (kind.backend(), content) {
            (Backend::Metadata(collection), NewContent::Value(value)) => {
                self.metadata.insert(collection, &key.id, &value).await
            }
            (Backend::Blob(bucket), NewContent::Blob(blob)) => {
                self.blobs.put(&key.blob_path(bucket), blob).await
            }
            _ => Err(StorageError::Mismatch(kind.to_string())),
        }
    }

    async fn fetch(&self, kind: Kind, key: &EntryKey) -> Result<Option<StoredContent>> {
        match kind.backend() {
            Backend::Metadata(collection) => Ok(self
                .metadata
                .fetch(collection, &key.id)
                .await?
                .map(StoredContent::Record)),
            Backend::Blob(bucket) => Ok(self
                .blobs
                .get(&key.blob_path(bucket))
                .await?
                .map(StoredContent::Blob)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryBlobStore, InMemoryMetadataStore};
    use bytes::Bytes;
    use keyhole_core::{Collection, Extension, Identifier, NewBlob};

    fn backends() -> Backends<InMemoryMetadataStore, InMemoryBlobStore> {
        Backends::new(InMemoryMetadataStore::new(), InMemoryBlobStore::new())
    }

    fn key() -> EntryKey {
        EntryKey::new(Identifier::parse("bcdfghjkmn").unwrap())
    }

    #[tokio::test]
    async fn metadata_kinds_go_to_their_collection() {
        let store = backends();

        store
            .insert_or_put(Kind::Link, &key(), NewContent::Value("https://a.b".into()))
            .await
            .unwrap();

        assert_eq!(store.metadata().len(), 1);
        assert!(store.blobs().is_empty());
        let record = store
            .metadata()
            .fetch(Collection::Links, &key().id)
            .await
            .unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn blob_kinds_go_to_their_prefix() {
        let store = backends();
        let key = EntryKey::with_ext(key().id, Some(Extension::parse("png").unwrap()));

        store
            .insert_or_put(
                Kind::Image,
                &key,
                NewContent::Blob(NewBlob {
                    body: Bytes::from_static(b"png"),
                    content_type: "image/png".into(),
                }),
            )
            .await
            .unwrap();

        assert!(store.metadata().is_empty());
        assert!(store
            .blobs()
            .get("images/bcdfghjkmn.png")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn fetch_only_reads_the_kinds_backend() {
        let store = backends();

        store
            .insert_or_put(Kind::Text, &key(), NewContent::Value("hello".into()))
            .await
            .unwrap();

        assert!(store.fetch(Kind::Link, &key()).await.unwrap().is_none());
        assert!(store.fetch(Kind::File, &key()).await.unwrap().is_none());
        assert!(matches!(
            store.fetch(Kind::Text, &key()).await.unwrap(),
            Some(StoredContent::Record(_))
        ));
    }

    #[tokio::test]
    async fn mismatched_content_is_rejected() {
        let store = backends();

        let err = store
            .insert_or_put(Kind::File, &key(), NewContent::Value("text".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Mismatch(_)));
        assert!(store.metadata().is_empty());
        assert!(store.blobs().is_empty());
    }
}
