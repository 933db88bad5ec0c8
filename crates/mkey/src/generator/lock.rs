use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Config, Error, Id, Layout, MonotonicClock, Result, TimeSource};

/// The only mutable state: the last millisecond used and the last step issued
/// within it.
#[derive(Debug, Default)]
struct State {
    time: i64,
    step: i64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// Every call to [`Generator::generate`] or [`Generator::generate_batch`] runs
/// inside one critical section guarding the last timestamp and step. When the
/// step space of the current millisecond is exhausted, the caller spins on the
/// clock *while holding the lock*, so every other caller of the same generator
/// waits for the next millisecond too. There is no timeout on that wait; wrap
/// calls externally if you need bounded latency.
///
/// Generators with distinct node numbers share nothing and never contend.
///
/// # Example
///
/// ```
/// use mkey::Generator;
///
/// let generator = Generator::new(5).unwrap();
/// let layout = generator.layout();
///
/// let a = generator.generate();
/// let b = generator.generate();
/// assert!(a < b);
/// assert_eq!(a.node(&layout), 5);
/// ```
#[derive(Debug)]
pub struct Generator<T = MonotonicClock>
where
    T: TimeSource,
{
    state: Mutex<State>,
    layout: Layout,
    node: i64,
    time: T,
}

impl Generator<MonotonicClock> {
    /// Creates a generator for `node` using the default layout and epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `node` is outside `[0, 1023]`.
    pub fn new(node: i64) -> Result<Self> {
        Self::with_config(Config::new(node))
    }

    /// Creates a generator from a full configuration, reading time from a
    /// [`MonotonicClock`] anchored at `config.epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration fails validation. No
    /// generator exists in that case.
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::with_epoch(config.epoch))
    }
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading time from `time`, which must report
    /// milliseconds since `config.epoch`.
    ///
    /// This is mostly useful for plugging in a mocked clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration fails validation.
    pub fn with_clock(config: Config, time: T) -> Result<Self> {
        let layout = config.layout()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(node = config.node, ?layout, "generator ready");

        Ok(Self {
            state: Mutex::new(State::default()),
            layout,
            node: config.node,
            time,
        })
    }

    /// The bit layout of every ID this generator issues. Needed to decompose
    /// them.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// This generator's node number.
    #[must_use]
    pub const fn node(&self) -> i64 {
        self.node
    }

    /// Issues the next ID.
    ///
    /// Within one millisecond the step increases by one per call. When it
    /// would wrap past the step mask, the call spins until the clock moves
    /// past the current millisecond and then starts again at step zero. A
    /// different millisecond, including an earlier one after a clock
    /// regression, also resets the step to zero.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Id {
        let mut state = self.state.lock();
        let mut now = self.time.current_millis();

        if now == state.time {
            state.step = (state.step + 1) & self.layout.step_mask();
            if state.step == 0 {
                now = self.wait_past(state.time);
            }
        } else {
            state.step = 0;
        }

        state.time = now;
        Id::from_raw(self.layout.compose(now, self.node, state.step))
    }

    /// Issues `count` IDs that share one millisecond and carry consecutive
    /// steps.
    ///
    /// A batch never spans a millisecond boundary: if the remaining step space
    /// of the current millisecond cannot hold all `count` IDs, the call spins
    /// until the next millisecond and starts the batch at step zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBatchCount`] if `count` is zero or exceeds the
    /// layout's step mask. The generator state is untouched in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use mkey::Generator;
    ///
    /// let generator = Generator::new(1).unwrap();
    /// let layout = generator.layout();
    /// let ids = generator.generate_batch(16).unwrap();
    ///
    /// assert_eq!(ids.len(), 16);
    /// for pair in ids.windows(2) {
    ///     assert_eq!(pair[0].time_offset(&layout), pair[1].time_offset(&layout));
    ///     assert_eq!(pair[0].step(&layout) + 1, pair[1].step(&layout));
    /// }
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    pub fn generate_batch(&self, count: usize) -> Result<Vec<Id>> {
        let max = self.layout.step_mask();
        let len = i64::try_from(count)
            .ok()
            .filter(|len| (1..=max).contains(len))
            .ok_or(Error::InvalidBatchCount { count, max })?;

        let mut state = self.state.lock();
        let mut now = self.time.current_millis();

        let first = if now != state.time {
            0
        } else if state.step + len > max {
            now = self.wait_past(state.time);
            0
        } else {
            state.step + 1
        };

        state.time = now;
        state.step = first + len - 1;
        Ok((first..=state.step)
            .map(|step| Id::from_raw(self.layout.compose(now, self.node, step)))
            .collect())
    }

    /// Returns a cryptographically random node number valid for this
    /// generator's layout. See [`Layout::random_node_id`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomSource`] if the entropy source is unavailable.
    pub fn random_node_id(&self) -> Result<i64> {
        self.layout.random_node_id()
    }

    /// Spins until the clock reads strictly later than `last`.
    #[cold]
    #[inline(never)]
    fn wait_past(&self, last: i64) -> i64 {
        #[cfg(feature = "tracing")]
        tracing::trace!(last, "step space exhausted, waiting for the next millisecond");

        let mut now = self.time.current_millis();
        while now <= last {
            core::hint::spin_loop();
            now = self.time.current_millis();
        }
        now
    }
}
