use crate::{CUSTOM_EPOCH, ConfigError, TimeSource};
use core::time::Duration;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP or daylight savings changes)
/// while still aligning timestamps to a fixed origin.
///
/// Internally, the clock captures `Instant::now()` at construction and adds
/// to it the duration elapsed since a given epoch (computed once from
/// `SystemTime::now()`). Reads never touch the wall clock again, so they never
/// move backward.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to the default [`CUSTOM_EPOCH`].
    ///
    /// Panics if system time is earlier than the custom epoch.
    fn default() -> Self {
        Self::with_epoch(CUSTOM_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// # Panics
    ///
    /// Panics if the current system time is earlier than the given epoch. Use
    /// [`MonotonicClock::try_with_epoch`] to handle that case.
    ///
    /// # Example
    ///
    /// ```
    /// use preflake::{MonotonicClock, TimeSource, CUSTOM_EPOCH};
    ///
    /// let clock = MonotonicClock::with_epoch(CUSTOM_EPOCH);
    /// let first = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(2));
    /// assert!(clock.current_millis() >= first);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        Self::try_with_epoch(epoch).expect("System clock before custom epoch")
    }

    /// Fallible counterpart to [`MonotonicClock::with_epoch`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EpochInFuture`] if the system clock is earlier
    /// than `epoch` (or earlier than the UNIX epoch).
    pub fn try_with_epoch(epoch: Duration) -> Result<Self, ConfigError> {
        let start = Instant::now();
        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ConfigError::EpochInFuture)?;
        let offset = system_now
            .checked_sub(epoch)
            .ok_or(ConfigError::EpochInFuture)?
            .as_millis() as u64;

        Ok(Self {
            start,
            epoch_offset: offset,
        })
    }
}

impl TimeSource<u64> for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.start.elapsed().as_millis() as u64
    }
}
