use core::fmt;

use crate::{DecodeError, Fields, Identifier};

/// A minimal interface for issuing and decoding identifiers.
///
/// Services can depend on this trait instead of a concrete generator, which
/// keeps the clock type out of their signatures and lets tests substitute a
/// fake.
pub trait IdGenerator {
    /// The error type returned by [`IdGenerator::generate`].
    type Err: fmt::Debug;

    /// Issues the next identifier carrying `pre`.
    ///
    /// # Errors
    ///
    /// Implementation specific; the lock-based [`Generator`] rejects an
    /// out-of-range `pre` and reports lock poisoning.
    ///
    /// [`Generator`]: crate::Generator
    fn generate(&self, pre: u64) -> Result<Identifier, Self::Err>;

    /// Decodes identifier text issued by this generator.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the text does not match the generator's
    /// layout.
    fn parse(&self, id: &str) -> Result<Fields, DecodeError>;
}

impl<G> IdGenerator for &G
where
    G: IdGenerator + ?Sized,
{
    type Err = G::Err;

    fn generate(&self, pre: u64) -> Result<Identifier, Self::Err> {
        (**self).generate(pre)
    }

    fn parse(&self, id: &str) -> Result<Fields, DecodeError> {
        (**self).parse(id)
    }
}

impl<G> IdGenerator for std::sync::Arc<G>
where
    G: IdGenerator + ?Sized,
{
    type Err = G::Err;

    fn generate(&self, pre: u64) -> Result<Identifier, Self::Err> {
        (**self).generate(pre)
    }

    fn parse(&self, id: &str) -> Result<Fields, DecodeError> {
        (**self).parse(id)
    }
}
