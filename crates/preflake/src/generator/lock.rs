use core::{fmt, time::Duration};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, DecodeError, Fields, IdGenerator, Identifier, Layout, MonotonicClock,
    RangeError, Result, Sequence, TimeSource, Transition,
    mutex::{Mutex, MutexGuard},
};

/// A lock-based identifier generator suitable for multi-threaded environments.
///
/// The `(time, step)` state sits behind a single [`Mutex`]. Each call to
/// [`Generator::generate`] reads the clock, advances the [`Sequence`] and
/// encodes the identifier inside that one critical section, so no two calls
/// can observe or produce the same `(time, step)` pair. Share it across
/// threads by reference or inside an `Arc`.
///
/// When every step of the current millisecond has been issued, the call spins
/// (without sleeping) until the clock moves to the next millisecond.
///
/// ## Ordering
///
/// `pre` is the most significant field, so numeric order follows `pre` first:
/// a later call with a smaller `pre` yields a smaller identifier. For a single
/// `pre` value identifiers increase in issue order, and the `(time, step)`
/// pair increases across every call on one generator.
///
/// ## Features
///
/// - `parking-lot`: use `parking_lot::Mutex`, which never poisons
/// - `cache-padded`: pad the lock to a cache line to avoid false sharing
/// - `tracing`: trace-level spans around generation
///
/// # Example
///
/// ```
/// use preflake::{CUSTOM_EPOCH, Generator, Layout};
///
/// let generator = Generator::new(1, CUSTOM_EPOCH, Layout::DEFAULT).unwrap();
///
/// let id = generator.generate(1234).unwrap();
/// assert_eq!(id.len(), 28);
///
/// let fields = generator.parse(id.as_str()).unwrap();
/// assert_eq!(fields.pre, 1234);
/// assert_eq!(fields.node, 1);
/// assert!(fields.time > 0);
/// ```
pub struct Generator<T = MonotonicClock>
where
    T: TimeSource<u64>,
{
    layout: Layout,
    node: u64,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<Sequence>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<Sequence>,
    time: T,
}

impl Generator<MonotonicClock> {
    /// Creates a generator for `node` whose timestamps count milliseconds
    /// since `epoch` (a [`Duration`] since the UNIX epoch) on a
    /// [`MonotonicClock`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NodeOutOfRange`] if `node` exceeds
    ///   [`Layout::max_node`]
    /// - [`ConfigError::EpochInFuture`] if the system clock is before `epoch`
    /// - [`ConfigError::TimeOutOfRange`] if the time since `epoch` already
    ///   exceeds [`Layout::max_time`]
    pub fn new(node: u64, epoch: Duration, layout: Layout) -> Result<Self, ConfigError> {
        let clock = MonotonicClock::try_with_epoch(epoch)?;
        Self::with_time_source(node, layout, clock)
    }
}

impl<T> Generator<T>
where
    T: TimeSource<u64>,
{
    /// Creates a generator that reads timestamps from `time`.
    ///
    /// # Errors
    ///
    /// See [`Generator::new`].
    pub fn with_time_source(node: u64, layout: Layout, time: T) -> Result<Self, ConfigError> {
        Self::from_components(node, layout, time, Sequence::new())
    }

    /// Creates a generator preloaded with an explicit [`Sequence`].
    ///
    /// This is useful for restoring state or for controlling the starting
    /// point of the generator manually. In typical use cases, prefer
    /// [`Generator::with_time_source`].
    ///
    /// # Errors
    ///
    /// See [`Generator::new`].
    pub fn from_components(
        node: u64,
        layout: Layout,
        time: T,
        sequence: Sequence,
    ) -> Result<Self, ConfigError> {
        let max_node = layout.max_node();
        if node > max_node {
            return Err(ConfigError::NodeOutOfRange {
                node,
                max: max_node,
            });
        }

        let now = time.current_millis();
        let max_time = layout.max_time();
        if now > max_time {
            return Err(ConfigError::TimeOutOfRange { now, max: max_time });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(node, ?layout, now, "generator initialized");

        Ok(Self {
            layout,
            node,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(sequence)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(sequence),
            time,
        })
    }

    /// The node id stamped into every identifier.
    #[must_use]
    pub const fn node(&self) -> u64 {
        self.node
    }

    /// The layout identifiers are encoded with.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Issues the next identifier carrying `pre`.
    ///
    /// # Errors
    ///
    /// - [`RangeError::PreOutOfRange`] if `pre` exceeds [`Layout::max_pre`];
    ///   the sequence state is left untouched
    /// - `Error::LockPoisoned` if another thread panicked while holding the
    ///   lock (std mutex only)
    ///
    /// Identifiers are unique until the clock passes [`Layout::max_time`].
    /// Beyond that the time field wraps and may repeat identifiers issued one
    /// horizon earlier.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self, pre: u64) -> Result<Identifier> {
        self.check_pre(pre)?;
        let mut seq = self.lock()?;
        let fields = self.next_fields(&mut seq, pre);
        let id = self.layout.encode(&fields);
        drop(seq);
        Ok(id)
    }

    /// Like [`Generator::generate`], but returns the fields instead of the
    /// encoded text.
    ///
    /// # Errors
    ///
    /// See [`Generator::generate`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_fields(&self, pre: u64) -> Result<Fields> {
        self.check_pre(pre)?;
        let mut seq = self.lock()?;
        Ok(self.next_fields(&mut seq, pre))
    }

    /// Decodes identifier text using this generator's layout.
    ///
    /// # Errors
    ///
    /// See [`Layout::parse`].
    pub fn parse(&self, id: &str) -> Result<Fields, DecodeError> {
        self.layout.parse(id)
    }

    fn check_pre(&self, pre: u64) -> Result<(), RangeError> {
        let max = self.layout.max_pre();
        if pre > max {
            return Err(RangeError::PreOutOfRange { pre, max });
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sequence>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    fn next_fields(&self, seq: &mut Sequence, pre: u64) -> Fields {
        let max_step = self.layout.max_step();
        let mut now = self.read_time();
        loop {
            match seq.advance(now, max_step) {
                Transition::Ready { time, step } => {
                    return Fields {
                        pre,
                        time,
                        node: self.node,
                        step,
                    };
                }
                Transition::Pending { .. } => now = self.wait_for_next_millis(seq.last_time()),
            }
        }
    }

    // Past the time field's horizon the reading wraps. The sequence sees the
    // wrapped value, so readings that collide after masking keep counting
    // steps.
    fn read_time(&self) -> u64 {
        let now = self.time.current_millis();
        let max = self.layout.max_time();
        if now > max {
            #[cfg(feature = "tracing")]
            tracing::warn!(now, max, "time field overflowed, wrapping");
            return now & max;
        }
        now
    }

    #[cold]
    #[inline(never)]
    fn wait_for_next_millis(&self, exhausted: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::trace!(exhausted, "step space exhausted, spinning");
        let max = self.layout.max_time();
        loop {
            let now = self.time.current_millis() & max;
            if now != exhausted {
                return now;
            }
            core::hint::spin_loop();
        }
    }
}

impl<T> IdGenerator for Generator<T>
where
    T: TimeSource<u64>,
{
    type Err = crate::Error;

    fn generate(&self, pre: u64) -> Result<Identifier, Self::Err> {
        self.generate(pre)
    }

    fn parse(&self, id: &str) -> Result<Fields, DecodeError> {
        self.parse(id)
    }
}

impl<T> fmt::Debug for Generator<T>
where
    T: TimeSource<u64>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("layout", &self.layout)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
