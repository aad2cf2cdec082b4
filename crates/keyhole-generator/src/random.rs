use crate::Generator;
use keyhole_core::identifier::{ALPHABET, LENGTH};
use keyhole_core::Identifier;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;

/// Draws identifiers uniformly from the identifier alphabet.
///
/// Randomness comes from the operating system CSPRNG, so identifiers cannot be
/// predicted from previously issued ones. With 36 symbols and a length of 10
/// there are about 3.6e15 identifiers.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    symbols: Uniform<usize>,
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self {
            symbols: Uniform::new(0, ALPHABET.len()),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    type Output = Identifier;

    fn generate(&self) -> Self::Output {
        let code: String = self
            .symbols
            .sample_iter(OsRng)
            .take(LENGTH)
            .map(|index| ALPHABET[index] as char)
            .collect();
        Identifier::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn output_is_always_a_valid_identifier() {
        let generator = RandomGenerator::new();

        for _ in 0..10_000 {
            let id = generator.generate();
            assert_eq!(id.as_str().len(), LENGTH);
            assert!(id.as_str().bytes().all(|b| ALPHABET.contains(&b)));
            assert!(Identifier::parse(id.as_str()).is_ok());
        }
    }

    #[test]
    fn large_batch_has_no_duplicates_in_practice() {
        let generator = RandomGenerator::new();
        let ids: HashSet<_> = (0..10_000).map(|_| generator.generate()).collect();

        // Not guaranteed, but a duplicate here would mean the entropy source is broken.
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn every_symbol_shows_up() {
        let generator = RandomGenerator::new();
        let seen: HashSet<u8> = (0..2_000)
            .flat_map(|_| generator.generate().as_str().bytes().collect::<Vec<_>>())
            .collect();

        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
