use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The kind of content an identifier names.
///
/// The kind decides both which backend holds the entry and what shape the
/// resolved response takes. It is fixed when the entry is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Link,
    Text,
    Image,
    File,
}

/// Where the entries of a kind live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Metadata(Collection),
    Blob(Bucket),
}

/// A table of small structured records in the metadata store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Links,
    Texts,
}

/// A key prefix in the blob store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Images,
    Files,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Link, Kind::Text, Kind::Image, Kind::File];

    pub fn backend(self) -> Backend {
        match self {
            Kind::Link => Backend::Metadata(Collection::Links),
            Kind::Text => Backend::Metadata(Collection::Texts),
            Kind::Image => Backend::Blob(Bucket::Images),
            Kind::File => Backend::Blob(Bucket::Files),
        }
    }

    /// The canonical tag, also used as the first segment of public URLs.
    pub fn tag(self) -> &'static str {
        match self {
            Kind::Link => "link",
            Kind::Text => "text",
            Kind::Image => "image",
            Kind::File => "file",
        }
    }

    /// The single-letter alias accepted on input.
    pub fn short_tag(self) -> &'static str {
        match self {
            Kind::Link => "l",
            Kind::Text => "t",
            Kind::Image => "i",
            Kind::File => "f",
        }
    }

    pub fn is_blob(self) -> bool {
        matches!(self.backend(), Backend::Blob(_))
    }
}

impl Collection {
    /// Table name.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Links => "links",
            Collection::Texts => "texts",
        }
    }

    /// Name of the payload column.
    pub fn field(self) -> &'static str {
        match self {
            Collection::Links => "target",
            Collection::Texts => "content",
        }
    }
}

impl Bucket {
    pub fn prefix(self) -> &'static str {
        match self {
            Bucket::Images => "images",
            Bucket::Files => "files",
        }
    }
}

impl FromStr for Kind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s || kind.short_tag() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_tags() {
        for kind in Kind::ALL {
            assert_eq!(kind.tag().parse::<Kind>().unwrap(), kind);
            assert_eq!(kind.short_tag().parse::<Kind>().unwrap(), kind);
        }
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!("video".parse::<Kind>().is_err());
        assert!("".parse::<Kind>().is_err());
        assert!("LINK".parse::<Kind>().is_err());
    }

    #[test]
    fn backend_selection() {
        assert_eq!(Kind::Link.backend(), Backend::Metadata(Collection::Links));
        assert_eq!(Kind::Text.backend(), Backend::Metadata(Collection::Texts));
        assert_eq!(Kind::Image.backend(), Backend::Blob(Bucket::Images));
        assert_eq!(Kind::File.backend(), Backend::Blob(Bucket::Files));
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        assert_eq!(serde_json::to_string(&Kind::Image).unwrap(), "\"image\"");
        let kind: Kind = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(kind, Kind::File);
    }
}
