use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Symbols an identifier may contain.
///
/// Digits and letters that are easily confused (`0/O`, `1/I/l`) are left out,
/// as are vowels, so generated identifiers never spell words.
pub const ALPHABET: &[u8; 36] = b"6789BCDFGHJKLMNPQRTWbcdfghjkmnpqrtwz";

/// Number of symbols in every identifier.
pub const LENGTH: usize = 10;

/// A public identifier naming one stored entry.
///
/// Identifiers share a single namespace across every kind and both stores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parses an identifier, checking its length and alphabet.
    pub fn parse(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Creates an identifier without validation.
    ///
    /// Use this only for values produced by a generator drawing from [`ALPHABET`].
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), CoreError> {
        if value.len() != LENGTH {
            return Err(CoreError::InvalidIdentifier(format!(
                "length must be {}, got {}",
                LENGTH,
                value.len()
            )));
        }

        if !value.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(CoreError::InvalidIdentifier(format!(
                "contains symbols outside the identifier alphabet: '{}'",
                value
            )));
        }

        Ok(())
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_identifiers() {
        assert!(Identifier::parse("6789BCDFGH").is_ok());
        assert!(Identifier::parse("zzzzzzzzzz").is_ok());
        assert!(Identifier::parse("bcdfghjkmn").is_ok());
    }

    #[test]
    fn wrong_length() {
        assert!(Identifier::parse("").is_err());
        assert!(Identifier::parse("zzzzzzzzz").is_err());
        assert!(Identifier::parse("zzzzzzzzzzz").is_err());
    }

    #[test]
    fn ambiguous_symbols_are_rejected() {
        assert!(Identifier::parse("0zzzzzzzzz").is_err());
        assert!(Identifier::parse("Ozzzzzzzzz").is_err());
        assert!(Identifier::parse("1zzzzzzzzz").is_err());
        assert!(Identifier::parse("lzzzzzzzzz").is_err());
        assert!(Identifier::parse("azzzzzzzzz").is_err());
    }

    #[test]
    fn path_characters_are_rejected() {
        assert!(Identifier::parse("../zzzzzzz").is_err());
        assert!(Identifier::parse("zzzz/zzzzz").is_err());
    }

    #[test]
    fn alphabet_has_no_duplicates() {
        let mut symbols = ALPHABET.to_vec();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), ALPHABET.len());
    }

    #[test]
    fn deserialize_validates() {
        let id: Identifier = serde_json::from_str("\"zzzzzzzzzz\"").unwrap();
        assert_eq!(id.as_str(), "zzzzzzzzzz");
        assert!(serde_json::from_str::<Identifier>("\"nope\"").is_err());
    }
}
