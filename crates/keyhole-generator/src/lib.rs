//! Identifier generators.

pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use keyhole_core::Identifier;

/// Trait for generating identifiers.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is not checked here; stores reject a taken key with a conflict.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<Identifier>;

    fn generate(&self) -> Self::Output;
}
