use bytes::Bytes;
use keyhole_core::{Identifier, Kind};

/// A request to publish one entry.
///
/// `kind` is kept as the raw tag so that an unknown kind is reported by the
/// router like any other validation failure.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub kind: String,
    pub payload: Payload,
}

impl CreateRequest {
    pub fn text(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::Text(value.into()),
        }
    }

    pub fn blob(kind: impl Into<String>, upload: BlobUpload) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::Blob(upload),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    /// A link target or text body.
    Text(String),
    /// Image or file bytes.
    Blob(BlobUpload),
}

#[derive(Debug, Clone, Default)]
pub struct BlobUpload {
    /// `None` when the caller sent no file at all.
    pub body: Option<Bytes>,
    /// Extension hint, with or without the leading dot.
    pub ext: Option<String>,
    pub content_type: Option<String>,
}

impl BlobUpload {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// The result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: Identifier,
    pub kind: Kind,
    /// Path that resolves the entry, e.g. `/link/<id>` or `/image/<id>.png`.
    pub url: String,
}
