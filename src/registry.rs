//! Keyed throttle state: one traffic contract enforced independently per
//! client, connection, or other key.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::builder::ContractBuilder;
use crate::cellrate::CellRateThrottle;
use crate::clock::MonotonicClock;
use crate::error::ThrottleError;
use crate::throttle::{Throttle, Ticks};

/// Per-key throttle state for one contract.
#[derive(Debug)]
struct RegistryEntry {
    throttle: CellRateThrottle,
    /// Tick of the most recent admission attempt, for stale-entry cleanup.
    touched: Ticks,
}

/// A registry enforcing one traffic contract independently per key.
///
/// Throttle state is created lazily on a key's first event and kept in a
/// [`DashMap`], so the registry can be shared across threads behind a plain
/// reference. Each admission runs under the map entry's shard lock, which
/// provides the exclusive admissible/commit pairing the throttles themselves
/// require.
///
/// # Example
///
/// ```
/// use cell_ratelimit::{CellRateThrottle, ThrottleRegistry};
///
/// // 100 events/s per client with a one second burst tolerance.
/// let registry = ThrottleRegistry::new(
///     CellRateThrottle::builder().peak(100, 1_000_000),
/// );
///
/// match registry.try_admit("client_42") {
///     Ok(()) => { /* forward the event */ }
///     Err(err) => { /* drop it, or retry after err.retry_after() */ }
/// }
/// ```
#[derive(Debug)]
pub struct ThrottleRegistry<K: Eq + Hash> {
    contract: ContractBuilder,
    clock: MonotonicClock,
    state: DashMap<K, RegistryEntry>,
}

impl<K: Eq + Hash> ThrottleRegistry<K> {
    /// A registry applying `contract` to every key.
    pub fn new(contract: ContractBuilder) -> Self {
        let clock = MonotonicClock::with_frequency(contract.frequency);
        Self {
            contract,
            clock,
            state: DashMap::new(),
        }
    }

    /// Run the admission protocol for one event under `key`.
    ///
    /// Admissible events are committed and `Ok(())` is returned. Rejected
    /// events are rolled back and reported as
    /// [`ThrottleError::Throttled`] carrying the advisory retry delay.
    pub fn try_admit(&self, key: K) -> Result<(), ThrottleError> {
        let now = self.clock.now();
        let mut entry = self.state.entry(key).or_insert_with(|| {
            let mut throttle = self.contract.clone().build();
            throttle.reset(now);
            RegistryEntry { throttle, touched: now }
        });
        entry.touched = now;

        let delay = entry.throttle.admissible(now);
        if delay == 0 {
            entry.throttle.commit();
            Ok(())
        } else {
            entry.throttle.rollback();
            let retry_after = self.clock.ticks_to_duration(delay);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                delay_ticks = delay,
                retry_after_us = retry_after.as_micros() as u64,
                "traffic contract exceeded, rejecting event"
            );
            Err(ThrottleError::Throttled(retry_after))
        }
    }

    /// Remove state for keys that have not attempted an event within
    /// `idle`.
    ///
    /// Call periodically in long-running applications to stop abandoned
    /// keys from accumulating. A removed key simply starts from a fresh
    /// throttle on its next event.
    pub fn cleanup(&self, idle: Duration) {
        let now = self.clock.now();
        let idle_ticks = self.clock.duration_to_ticks(idle);
        self.state
            .retain(|_, entry| entry.touched > now.saturating_sub(idle_ticks));
    }

    /// The number of keys currently holding throttle state.
    ///
    /// Useful for monitoring memory usage.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state.len()
    }
}
