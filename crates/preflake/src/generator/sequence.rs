/// Outcome of a single [`Sequence::advance`] call.
///
/// - [`Transition::Ready`] carries the `(time, step)` pair to stamp into the
///   next identifier.
/// - [`Transition::Pending`] means every step of the current millisecond has
///   been issued; the caller must wait until the clock reaches `yield_until`
///   and advance again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// A fresh `(time, step)` pair was reserved.
    Ready {
        /// Millisecond the identifier is stamped with.
        time: u64,
        /// Position within that millisecond.
        step: u64,
    },
    /// The step space for the current millisecond is exhausted.
    Pending {
        /// The earliest clock reading (inclusive) that can be issued next.
        yield_until: u64,
    },
}

/// Last-issued `(time, step)` state of a generator.
///
/// Starts at `(0, 0)`. On each advance:
///
/// - a reading equal to the last time increments the step, wrapping within
///   the step field; a wrap to zero means the millisecond is exhausted and
///   nothing is reserved
/// - any other reading, including one behind the last time, resets the step
///   to zero
///
/// ```
/// use preflake::{Sequence, Transition};
///
/// let mut seq = Sequence::new();
/// assert_eq!(seq.advance(7, 1), Transition::Ready { time: 7, step: 0 });
/// assert_eq!(seq.advance(7, 1), Transition::Ready { time: 7, step: 1 });
/// assert_eq!(seq.advance(7, 1), Transition::Pending { yield_until: 8 });
/// assert_eq!(seq.advance(8, 1), Transition::Ready { time: 8, step: 0 });
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sequence {
    last_time: u64,
    last_step: u64,
}

impl Sequence {
    #[must_use]
    pub const fn new() -> Self {
        Self::from_components(0, 0)
    }

    /// Restores a sequence from a previously observed `(time, step)` pair.
    #[must_use]
    pub const fn from_components(last_time: u64, last_step: u64) -> Self {
        Self {
            last_time,
            last_step,
        }
    }

    #[must_use]
    pub const fn last_time(&self) -> u64 {
        self.last_time
    }

    #[must_use]
    pub const fn last_step(&self) -> u64 {
        self.last_step
    }

    /// Reserves the next `(time, step)` pair for the clock reading `now`.
    ///
    /// `max_step` must be an all-ones mask (`2^bits - 1`). State is only
    /// updated when the result is [`Transition::Ready`].
    pub fn advance(&mut self, now: u64, max_step: u64) -> Transition {
        let step = if now == self.last_time {
            let step = self.last_step.wrapping_add(1) & max_step;
            if step == 0 {
                return Self::cold_exhausted(self.last_time);
            }
            step
        } else {
            0
        };

        self.last_time = now;
        self.last_step = step;
        Transition::Ready { time: now, step }
    }

    #[cold]
    #[inline(never)]
    fn cold_exhausted(last_time: u64) -> Transition {
        Transition::Pending {
            yield_until: last_time.saturating_add(1),
        }
    }
}
