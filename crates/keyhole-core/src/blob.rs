use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};

/// A blob about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlob {
    pub body: Bytes,
    pub content_type: String,
}

/// A blob read back from the store, with the HTTP metadata kept alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub body: Bytes,
    pub content_type: String,
    /// Lowercase hex SHA-256 of `body`, unquoted.
    pub etag: String,
}

impl StoredBlob {
    /// Seals a new blob, computing its etag.
    pub fn seal(blob: NewBlob) -> Self {
        let etag = compute_etag(&blob.body);
        Self {
            body: blob.body,
            content_type: blob.content_type,
            etag,
        }
    }
}

/// Persists opaque byte payloads addressed by path (e.g. `images/<id>.png`).
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Writes a blob. Returns `Err(Conflict)` if something is already stored at `path`.
    async fn put(&self, path: &str, blob: NewBlob) -> Result<()>;

    /// Reads a blob. Returns `None` if nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<StoredBlob>>;
}

/// Computes the etag of a blob body.
pub fn compute_etag(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
