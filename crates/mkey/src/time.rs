use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Default epoch: Tuesday, November 12, 2024 17:00:00 UTC, in milliseconds
/// since the Unix epoch.
pub const DEFAULT_EPOCH: i64 = 1_731_430_800_000;

const NANOS_PER_MILLI: i128 = 1_000_000;

/// A trait for time sources that return the number of milliseconds elapsed
/// since a generator's epoch.
///
/// This abstraction allows you to plug in the real [`MonotonicClock`] or a
/// mocked time source in tests.
///
/// # Example
///
/// ```
/// use mkey::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> i64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> i64 {
        (**self).current_millis()
    }
}

/// A monotonic time source measuring elapsed time since construction, offset
/// so that zero falls on a user-defined epoch.
///
/// The wall clock is read exactly once, when the clock is built. Every later
/// reading adds the [`Instant`] elapsed since then, so timestamps never move
/// backwards even if the system clock is adjusted.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    anchor: Instant,
    // Nanoseconds between the epoch and `anchor`. Negative when the epoch lies
    // in the future.
    anchor_offset: i128,
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock whose origin (t = 0) is `epoch`, given in
    /// milliseconds since the Unix epoch.
    ///
    /// # Example
    ///
    /// ```
    /// use mkey::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::with_epoch(0);
    /// let unix_millis = std::time::SystemTime::now()
    ///     .duration_since(std::time::UNIX_EPOCH)
    ///     .unwrap()
    ///     .as_millis() as i64;
    /// assert!((clock.current_millis() - unix_millis).abs() < 1_000);
    /// ```
    #[must_use]
    pub fn with_epoch(epoch: i64) -> Self {
        let anchor = Instant::now();
        let wall = unix_nanos(SystemTime::now());
        Self {
            anchor,
            anchor_offset: wall - i128::from(epoch) * NANOS_PER_MILLI,
        }
    }
}

impl TimeSource for MonotonicClock {
    #[allow(clippy::cast_possible_truncation)]
    fn current_millis(&self) -> i64 {
        let nanos = self.anchor_offset + self.anchor.elapsed().as_nanos() as i128;
        nanos.div_euclid(NANOS_PER_MILLI) as i64
    }
}

/// Signed nanoseconds between the Unix epoch and `time`.
fn unix_nanos(time: SystemTime) -> i128 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i128,
        Err(before) => -(before.duration().as_nanos() as i128),
    }
}

/// Converts signed Unix milliseconds into a [`SystemTime`].
pub(crate) fn system_time_from_millis(millis: i64) -> SystemTime {
    let magnitude = core::time::Duration::from_millis(millis.unsigned_abs());
    if millis >= 0 {
        UNIX_EPOCH + magnitude
    } else {
        UNIX_EPOCH - magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_never_goes_backwards() {
        let clock = MonotonicClock::default();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn future_epoch_yields_negative_offsets() {
        let in_an_hour = unix_nanos(SystemTime::now()) / NANOS_PER_MILLI + 3_600_000;
        let clock = MonotonicClock::with_epoch(in_an_hour as i64);
        let now = clock.current_millis();
        assert!(now < 0);
        assert!(now > -3_700_000);
    }

    #[test]
    fn default_epoch_is_in_the_past() {
        let clock = MonotonicClock::default();
        assert!(clock.current_millis() > 0);
    }

    #[test]
    fn system_time_conversion_handles_both_signs() {
        assert_eq!(system_time_from_millis(0), UNIX_EPOCH);
        assert_eq!(
            system_time_from_millis(DEFAULT_EPOCH)
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis(),
            1_731_430_800_000
        );
        assert_eq!(
            UNIX_EPOCH
                .duration_since(system_time_from_millis(-1_500))
                .unwrap()
                .as_millis(),
            1_500
        );
    }
}
