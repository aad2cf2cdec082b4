use crate::error::CoreError;
use crate::identifier::{Identifier, LENGTH};
use crate::kind::{Bucket, Kind};
use std::fmt::Display;

const MAX_EXTENSION_LENGTH: usize = 16;

/// A file extension attached to a blob entry, always stored with its leading dot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extension(String);

impl Extension {
    /// Parses an extension given with or without its leading dot.
    ///
    /// After the dot, 1-16 ASCII alphanumeric characters are allowed.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let bare = value.strip_prefix('.').unwrap_or(value);

        if bare.is_empty() || bare.len() > MAX_EXTENSION_LENGTH {
            return Err(CoreError::InvalidExtension(format!(
                "length must be between 1 and {}, got {}",
                MAX_EXTENSION_LENGTH,
                bare.len()
            )));
        }

        if !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidExtension(format!(
                "must contain only alphanumeric characters: '{}'",
                value
            )));
        }

        Ok(Self(format!(".{bare}")))
    }

    /// Returns the extension including its leading dot.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the extension without its leading dot.
    pub fn bare(&self) -> &str {
        &self.0[1..]
    }
}

impl Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The address of one entry inside its backend.
///
/// Metadata entries are keyed by identifier alone. Blob entries also carry the
/// extension supplied at creation, which is part of their stored path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub id: Identifier,
    pub ext: Option<Extension>,
}

impl EntryKey {
    pub fn new(id: Identifier) -> Self {
        Self { id, ext: None }
    }

    pub fn with_ext(id: Identifier, ext: Option<Extension>) -> Self {
        Self { id, ext }
    }

    /// Parses a filename of the form `<id><ext>`, where the extension is optional.
    pub fn parse_filename(filename: &str) -> Result<Self, CoreError> {
        let (id, rest) = match (filename.get(..LENGTH), filename.get(LENGTH..)) {
            (Some(id), Some(rest)) => (id, rest),
            _ => {
                return Err(CoreError::InvalidIdentifier(format!(
                    "filename is too short: '{}'",
                    filename
                )))
            }
        };

        let id = Identifier::parse(id)?;
        let ext = match rest {
            "" => None,
            ext if ext.starts_with('.') => Some(Extension::parse(ext)?),
            ext => {
                return Err(CoreError::InvalidExtension(format!(
                    "must start with a dot: '{}'",
                    ext
                )))
            }
        };

        Ok(Self { id, ext })
    }

    /// The `<id><ext>` form used in blob paths and public URLs.
    pub fn filename(&self) -> String {
        match &self.ext {
            Some(ext) => format!("{}{}", self.id, ext),
            None => self.id.to_string(),
        }
    }

    /// The path of this entry inside the blob store, e.g. `images/<id>.png`.
    pub fn blob_path(&self, bucket: Bucket) -> String {
        format!("{}/{}", bucket.prefix(), self.filename())
    }

    /// The public path that resolves this entry, e.g. `/link/<id>`.
    pub fn url_path(&self, kind: Kind) -> String {
        format!("/{}/{}", kind.tag(), self.filename())
    }
}

impl Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.filename())
    }
}
