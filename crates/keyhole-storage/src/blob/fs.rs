use async_trait::async_trait;
use bytes::Bytes;
use keyhole_core::{BlobStore, NewBlob, Result, StorageError, StoredBlob};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// HTTP metadata kept next to each blob as `<path>.meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlobMeta {
    content_type: String,
    etag: String,
    size: u64,
}

/// Filesystem implementation of [`BlobStore`].
///
/// Blobs are stored at `<root>/<path>`, e.g. `<root>/images/<id>.png`. The data
/// file is created with `create_new`, which makes puts exclusive. The sidecar is
/// written last via rename, and a blob without a sidecar is treated as absent.
/// A put that fails after creating the data file removes it again.
///
/// Ids are case-sensitive, so `root` must be on a case-sensitive filesystem.
/// On a case-insensitive one two ids differing only in case share a file, and
/// the second put reports [`StorageError::Conflict`].
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(StorageError::InvalidData(format!(
                "blob path must be relative without '..': '{}'",
                path
            )));
        }

        Ok(self.root.join(relative))
    }

    fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Writes the body into a freshly created data file, then its sidecar.
    async fn fill(mut file: fs::File, data_path: &Path, blob: NewBlob) -> Result<BlobMeta> {
        file.write_all(&blob.body).await?;
        file.sync_all().await?;
        drop(file);

        let sealed = StoredBlob::seal(blob);
        let meta = BlobMeta {
            content_type: sealed.content_type,
            etag: sealed.etag,
            size: sealed.body.len() as u64,
        };
        let encoded = serde_json::to_vec(&meta)
            .map_err(|e| StorageError::InvalidData(format!("encode blob metadata: {e}")))?;

        let meta_path = Self::with_suffix(data_path, ".meta.json");
        let temp_path = Self::with_suffix(data_path, ".meta.json.tmp");
        fs::write(&temp_path, encoded).await?;
        fs::rename(&temp_path, &meta_path).await?;

        Ok(meta)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, blob: NewBlob) -> Result<()> {
        let data_path = self.data_path(path)?;
        if let Some(parent) = data_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::Conflict(path.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let meta = match Self::fill(file, &data_path, blob).await {
            Ok(meta) => meta,
            Err(err) => {
                let _ = fs::remove_file(Self::with_suffix(&data_path, ".meta.json.tmp")).await;
                let _ = fs::remove_file(&data_path).await;
                return Err(err);
            }
        };

        debug!(path, etag = %meta.etag, size = meta.size, "stored blob on disk");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<StoredBlob>> {
        let data_path = self.data_path(path)?;
        let meta_path = Self::with_suffix(&data_path, ".meta.json");

        let encoded = match fs::read(&meta_path).await {
            Ok(encoded) => encoded,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let meta: BlobMeta = serde_json::from_slice(&encoded).map_err(|e| {
            StorageError::InvalidData(format!("blob metadata for '{}': {e}", path))
        })?;

        let body = match fs::read(&data_path).await {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::InvalidData(format!(
                    "blob metadata without data: '{}'",
                    path
                )));
            }
            Err(err) => return Err(err.into()),
        };

        if body.len() as u64 != meta.size {
            return Err(StorageError::InvalidData(format!(
                "blob '{}' has {} bytes, metadata says {}",
                path,
                body.len(),
                meta.size
            )));
        }

        Ok(Some(StoredBlob {
            body: Bytes::from(body),
            content_type: meta.content_type,
            etag: meta.etag,
        }))
    }
}
