//! Store implementations for Keyhole.
//!
//! Metadata stores hold link and text records; blob stores hold image and
//! file bytes. [`Backends`] puts one of each behind the core `ContentStore`.

pub mod backends;
pub mod blob;
pub mod metadata;

pub use backends::Backends;
pub use blob::fs::FsBlobStore;
pub use blob::memory::InMemoryBlobStore;
pub use keyhole_core::{BlobStore, ContentStore, MetadataStore, StorageError};
pub use metadata::memory::InMemoryMetadataStore;
pub use metadata::mysql::MySqlMetadataStore;
