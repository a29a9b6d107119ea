//! Monotonic tick source.

use std::time::{Duration, Instant};

use crate::throttle::Ticks;

/// A monotonic clock counting ticks since its construction.
///
/// The tick frequency defaults to nanosecond resolution and is fixed for the
/// lifetime of the clock. The clock is `Copy`, so a contract's legs can share
/// one epoch by value.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
    frequency: Ticks,
}

impl MonotonicClock {
    /// Nanoseconds per second, the default tick frequency.
    pub const NANOS_PER_SEC: Ticks = 1_000_000_000;

    /// A clock ticking at nanosecond resolution, starting now.
    pub fn new() -> Self {
        Self::with_frequency(Self::NANOS_PER_SEC)
    }

    /// A clock ticking `frequency` times per second, starting now.
    ///
    /// # Panics
    ///
    /// Panics if `frequency` is 0.
    pub fn with_frequency(frequency: Ticks) -> Self {
        assert!(frequency > 0, "frequency must be greater than 0");
        Self {
            epoch: Instant::now(),
            frequency,
        }
    }

    /// Ticks elapsed since the clock's epoch, saturating at `Ticks::MAX`
    /// (which would take centuries of uptime to reach at any realistic
    /// frequency).
    #[inline]
    pub fn now(&self) -> Ticks {
        let nanos = self.epoch.elapsed().as_nanos();
        let ticks = nanos * self.frequency as u128 / Self::NANOS_PER_SEC as u128;
        ticks.min(Ticks::MAX as u128) as Ticks
    }

    /// Ticks per second.
    #[inline]
    pub fn frequency(&self) -> Ticks {
        self.frequency
    }

    /// Convert a tick count at this clock's frequency into a [`Duration`].
    pub fn ticks_to_duration(&self, ticks: Ticks) -> Duration {
        let nanos = ticks as u128 * Self::NANOS_PER_SEC as u128 / self.frequency as u128;
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }

    /// Convert a [`Duration`] into a tick count at this clock's frequency,
    /// saturating at `Ticks::MAX`.
    pub fn duration_to_ticks(&self, duration: Duration) -> Ticks {
        let ticks = duration.as_nanos() * self.frequency as u128 / Self::NANOS_PER_SEC as u128;
        ticks.min(Ticks::MAX as u128) as Ticks
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_default_frequency_is_nanoseconds() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.frequency(), MonotonicClock::NANOS_PER_SEC);
    }

    #[test]
    fn test_tick_duration_round_trip_at_microsecond_frequency() {
        let clock = MonotonicClock::with_frequency(1_000_000);
        assert_eq!(clock.ticks_to_duration(2_000), Duration::from_millis(2));
        assert_eq!(clock.duration_to_ticks(Duration::from_millis(2)), 2_000);
    }

    #[test]
    #[should_panic(expected = "frequency must be greater than 0")]
    fn test_zero_frequency_panics() {
        MonotonicClock::with_frequency(0);
    }
}
