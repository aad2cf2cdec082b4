use crate::Generator;
use keyhole_core::identifier::{ALPHABET, LENGTH};
use keyhole_core::Identifier;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator encoding a counter in the identifier alphabet.
///
/// Produces `6666666666`, `6666666667`, ... so tests and fixtures can predict
/// identifiers. Not suitable for public deployments: identifiers are guessable.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator starting from a specific counter value.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }

    fn encode(mut value: u64) -> String {
        let base = ALPHABET.len() as u64;
        let mut symbols = [ALPHABET[0]; LENGTH];

        for slot in symbols.iter_mut().rev() {
            *slot = ALPHABET[(value % base) as usize];
            value /= base;
        }

        symbols.iter().map(|&b| b as char).collect()
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for SeqGenerator {
    type Output = Identifier;

    fn generate(&self) -> Self::Output {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        Identifier::new_unchecked(Self::encode(count))
    }
}
