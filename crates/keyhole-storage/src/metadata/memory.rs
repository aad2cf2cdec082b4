use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use keyhole_core::{Collection, Identifier, MetadataRecord, MetadataStore, Result, StorageError};
use tracing::trace;

/// In-memory implementation of [`MetadataStore`] using DashMap.
///
/// DashMap shards its locks, so concurrent inserts and reads of different
/// identifiers do not block each other.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    storage: DashMap<(Collection, Identifier), MetadataRecord>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Stores a record as-is, bypassing validation. Lets tests seed damaged rows.
    pub fn insert_raw(&self, collection: Collection, record: MetadataRecord) {
        self.storage.insert((collection, record.id.clone()), record);
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, collection: Collection, id: &Identifier, value: &str) -> Result<()> {
        match self.storage.entry((collection, id.clone())) {
            Entry::Occupied(_) => Err(StorageError::Conflict(format!("{collection}/{id}"))),
            Entry::Vacant(slot) => {
                slot.insert(MetadataRecord {
                    id: id.clone(),
                    value: Some(value.to_string()),
                    created_at: Timestamp::now(),
                });
                trace!(collection = %collection, id = %id, "inserted record");
                Ok(())
            }
        }
    }

    async fn fetch(
        &self,
        collection: Collection,
        id: &Identifier,
    ) -> Result<Option<MetadataRecord>> {
        Ok(self
            .storage
            .get(&(collection, id.clone()))
            .map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyhole_core::identifier::ALPHABET;
    use std::sync::Arc;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    #[tokio::test]
    async fn insert_and_fetch() {
        let store = InMemoryMetadataStore::new();

        store
            .insert(Collection::Links, &id("bcdfghjkmn"), "https://example.com")
            .await
            .unwrap();

        let record = store
            .fetch(Collection::Links, &id("bcdfghjkmn"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id, id("bcdfghjkmn"));
        assert_eq!(record.value.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn fetch_nonexistent() {
        let store = InMemoryMetadataStore::new();

        let record = store
            .fetch(Collection::Texts, &id("bcdfghjkmn"))
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = InMemoryMetadataStore::new();

        store
            .insert(Collection::Links, &id("bcdfghjkmn"), "https://example.com")
            .await
            .unwrap();

        let record = store
            .fetch(Collection::Texts, &id("bcdfghjkmn"))
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let store = InMemoryMetadataStore::new();

        store
            .insert(Collection::Texts, &id("bcdfghjkmn"), "first")
            .await
            .unwrap();

        let err = store
            .insert(Collection::Texts, &id("bcdfghjkmn"), "second")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let record = store
            .fetch(Collection::Texts, &id("bcdfghjkmn"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.value.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn concurrent_access() {
        let store = Arc::new(InMemoryMetadataStore::new());
        let ids: Vec<Identifier> = (0..10)
            .map(|i| id(&format!("bcdfghjkm{}", ALPHABET[i] as char)))
            .collect();
        let mut handles = vec![];

        for (i, key) in ids.iter().cloned().enumerate() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert(Collection::Texts, &key, &format!("text {i}"))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 10);
        for (i, key) in ids.iter().enumerate() {
            let record = store.fetch(Collection::Texts, key).await.unwrap().unwrap();
            assert_eq!(record.value, Some(format!("text {i}")));
        }
    }
}
