//! Core types and traits for Keyhole.
//!
//! This crate provides the value types shared by the create and resolve
//! paths (kinds, identifiers, entry keys) and the store traits both paths
//! are written against.

pub mod blob;
pub mod error;
pub mod identifier;
pub mod key;
pub mod kind;
pub mod metadata;
pub mod store;

pub use blob::{BlobStore, NewBlob, StoredBlob};
pub use error::{CoreError, ErrorClass, Result, StorageError};
pub use identifier::Identifier;
pub use key::{EntryKey, Extension};
pub use kind::{Backend, Bucket, Collection, Kind};
pub use metadata::{MetadataRecord, MetadataStore};
pub use store::{ContentStore, NewContent, StoredContent};
