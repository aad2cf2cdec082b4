use bytes::Bytes;

/// What a resolved entry should be answered with, independent of transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseDescriptor {
    /// Send the caller to the stored link target.
    Redirect { location: String },
    /// Return the stored text as a plain-text body.
    Text { body: String },
    /// Stream the stored blob with its content headers.
    Binary {
        body: Bytes,
        content_type: String,
        /// Unquoted; see [`ResponseDescriptor::etag_header`].
        etag: String,
    },
}

impl ResponseDescriptor {
    /// The etag in HTTP header form (a quoted strong validator).
    pub fn etag_header(&self) -> Option<String> {
        match self {
            ResponseDescriptor::Binary { etag, .. } => Some(format!("\"{etag}\"")),
            _ => None,
        }
    }
}
