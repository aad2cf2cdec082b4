use crate::error::ResolveError;
use crate::response::ResponseDescriptor;
use async_trait::async_trait;
use keyhole_core::{
    Backend, ContentStore, EntryKey, Identifier, Kind, MetadataRecord, StoredContent,
};
use std::sync::Arc;
use tracing::{debug, error, trace};

type Result<T> = std::result::Result<T, ResolveError>;

#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Resolves an entry to the response its kind calls for.
    ///
    /// `target` is the identifier for links and texts, and the stored filename
    /// (`<id><ext>`) for images and files.
    async fn resolve(&self, kind: Kind, target: &str) -> Result<ResponseDescriptor>;
}

/// Looks entries up in the store for their kind and shapes the response.
///
/// Each resolution is a single store read. Only the backend of the requested
/// kind is consulted, so an identifier asked for under the wrong kind is not found.
pub struct ContentResolver<S> {
    store: Arc<S>,
}

impl<S> Clone for ContentResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ContentStore> ContentResolver<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Parses the caller's target into the key the entry would be stored under.
    ///
    /// Returns `None` when no entry of this kind could have that key.
    fn entry_key(kind: Kind, target: &str) -> Option<EntryKey> {
        match kind.backend() {
            Backend::Metadata(_) => Identifier::parse(target).ok().map(EntryKey::new),
            Backend::Blob(_) => EntryKey::parse_filename(target).ok(),
        }
    }

    fn required_value(kind: Kind, record: MetadataRecord) -> Result<String> {
        match record.value {
            Some(value) if !value.is_empty() => Ok(value),
            _ => {
                error!(kind = %kind, id = %record.id, operation = "resolve", "stored record is missing its payload");
                Err(ResolveError::Inconsistent {
                    kind,
                    id: record.id.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl<S: ContentStore> Resolver for ContentResolver<S> {
    async fn resolve(&self, kind: Kind, target: &str) -> Result<ResponseDescriptor> {
        trace!(kind = %kind, target, "resolving entry");

        let Some(key) = Self::entry_key(kind, target) else {
            debug!(kind = %kind, target, "target is not a valid entry key");
            return Err(ResolveError::NotFound);
        };

        let content = self.store.fetch(kind, &key).await.map_err(|err| {
            error!(kind = %kind, id = %key.id, operation = "resolve", error = %err, "failed to fetch entry");
            ResolveError::StoreUnavailable(err)
        })?;

        let response = match (kind, content) {
            (_, None) => {
                trace!(kind = %kind, key = %key, "entry not found");
                return Err(ResolveError::NotFound);
            }
            (Kind::Link, Some(StoredContent::Record(record))) => ResponseDescriptor::Redirect {
                location: Self::required_value(kind, record)?,
            },
            (Kind::Text, Some(StoredContent::Record(record))) => ResponseDescriptor::Text {
                body: Self::required_value(kind, record)?,
            },
            (Kind::Image | Kind::File, Some(StoredContent::Blob(blob))) => {
                ResponseDescriptor::Binary {
                    body: blob.body,
                    content_type: blob.content_type,
                    etag: blob.etag,
                }
            }
            (_, Some(_)) => {
                error!(kind = %kind, id = %key.id, operation = "resolve", "store returned content of the wrong shape");
                return Err(ResolveError::Inconsistent {
                    kind,
                    id: key.id.to_string(),
                });
            }
        };

        debug!(kind = %kind, key = %key, "resolved entry");
        Ok(response)
    }
}
