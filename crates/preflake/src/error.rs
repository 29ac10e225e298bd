/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while building a generator or a [`Layout`].
///
/// These are fatal to the construction attempt: a generator that failed to
/// build must not be used.
///
/// [`Layout`]: crate::Layout
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The node id does not fit in the layout's node field.
    #[error("node id {node} is out of range (max {max})")]
    NodeOutOfRange { node: u64, max: u64 },

    /// A field width is zero, wider than 64 bits, or the layout does not fit
    /// in 128 bits.
    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: &'static str },

    /// The system clock reports a time earlier than the requested epoch.
    #[error("system clock is earlier than the configured epoch")]
    EpochInFuture,

    /// The clock already reads past what the time field can hold.
    #[error("clock reading {now} ms is out of range for the time field (max {max})")]
    TimeOutOfRange { now: u64, max: u64 },
}

/// Errors raised by a generator for a value the caller supplied.
///
/// Recoverable: the generator's sequence state is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum RangeError {
    /// The pre value does not fit in the layout's pre field.
    #[error("pre value {pre} is out of range (max {max})")]
    PreOutOfRange { pre: u64, max: u64 },
}

/// Errors raised when decoding identifier text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The text is not the fixed length the layout expects.
    #[error("invalid length: {len} (expected {expected})")]
    InvalidLength { len: usize, expected: usize },

    /// The text is outside the range of lengths a layout-agnostic parse
    /// accepts.
    #[error("invalid length: {len} (expected {min} to {max})")]
    LengthOutOfRange { len: usize, min: usize, max: usize },

    /// The text contains a byte that is not a hexadecimal digit.
    #[error("invalid byte {byte:#04x} at index {index}")]
    InvalidChar { byte: u8, index: usize },

    /// The text sets bits above the layout's total width.
    #[error("decoded value {raw:#x} overflows the layout")]
    Overflow { raw: u128 },
}

/// All errors that `preflake` can produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The generator's lock was poisoned by a thread that panicked while
    /// holding it.
    ///
    /// `parking_lot` mutexes never poison, so this variant is not available
    /// with the `parking-lot` feature.
    #[cfg_attr(docsrs, doc(cfg(all(feature = "std", not(feature = "parking-lot")))))]
    #[cfg(all(feature = "std", not(feature = "parking-lot")))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(all(feature = "std", not(feature = "parking-lot")))]
use crate::mutex::{MutexGuard, PoisonError};
#[cfg(all(feature = "std", not(feature = "parking-lot")))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
