//! GCRA (Generic Cell Rate Algorithm) implementation.
//!
//! The virtual scheduling form of the algorithm from ITU-T I.371 / the ATM
//! Forum traffic management specification: a continuous-state equivalent of
//! the leaky bucket. Each admitted event earns `increment` ticks of
//! theoretical credit; an event arriving before the credit has drained is
//! early, and early beyond `limit` ticks is a contract violation.

use crate::clock::MonotonicClock;
use crate::throttle::{Throttle, Ticks, TwoPhase};

/// A single-contract throttle implementing the Generic Cell Rate Algorithm.
///
/// The two GCRA parameters are:
///
/// - `increment` (I): ticks of theoretical credit charged per admitted
///   event, the inverse of the contract rate. An increment of 0 is the
///   unconstrained contract: every event is admissible and none ever alarms.
/// - `limit` (L): the tolerated slack, in ticks, bounding how early an event
///   may arrive before it violates the contract. With I > 0, up to
///   `L / I + 1` events may arrive back to back before the throttle pushes
///   back.
///
/// State updates follow the two-phase protocol described on
/// [`Throttle`]: [`admissible`](Throttle::admissible) only stages tentative
/// values, and [`commit`](Throttle::commit) folds them into committed state.
///
/// # Example
///
/// ```
/// use cell_ratelimit::{Gcra, Throttle};
///
/// // One event per 100 ticks, no jitter tolerance.
/// let mut gcra = Gcra::new(100, 0);
/// gcra.reset(0);
///
/// assert_eq!(gcra.admissible(0), 0); // first event is free
/// assert!(gcra.commit());
///
/// assert_eq!(gcra.admissible(50), 50); // 50 ticks early
/// assert!(gcra.rollback()); // abandon the attempt
///
/// assert_eq!(gcra.admissible(100), 0); // on schedule
/// assert!(gcra.commit());
/// ```
#[derive(Debug, Clone)]
pub struct Gcra {
    increment: Ticks,
    limit: Ticks,
    /// Largest event count a single commit can charge without the credit
    /// arithmetic overflowing; precomputed so commit never divides.
    max_events: u64,
    clock: MonotonicClock,
    /// Committed: the reference instant of the last committed event.
    /// Tentative: the `now` passed to the most recent `admissible`.
    then: TwoPhase<Ticks>,
    /// Theoretical credit, the x / x1 pair of the classic formulation.
    credit: TwoPhase<Ticks>,
    alarmed: TwoPhase<bool>,
    approximate: bool,
}

impl Gcra {
    /// A throttle enforcing the contract (`increment`, `limit`) against a
    /// fresh nanosecond clock, reset at the clock's epoch.
    pub fn new(increment: Ticks, limit: Ticks) -> Self {
        Self::with_clock(increment, limit, MonotonicClock::new())
    }

    /// A throttle enforcing (`increment`, `limit`) against an existing
    /// clock, so several legs of one contract can share an epoch and a tick
    /// frequency.
    pub fn with_clock(increment: Ticks, limit: Ticks, clock: MonotonicClock) -> Self {
        let max_events = if increment == 0 {
            u64::MAX
        } else {
            Ticks::MAX / increment
        };
        let mut gcra = Self {
            increment,
            limit,
            max_events,
            clock,
            then: TwoPhase::new(0),
            credit: TwoPhase::new(0),
            alarmed: TwoPhase::new(false),
            approximate: false,
        };
        let now = clock.now();
        gcra.reset(now);
        gcra
    }

    /// Ticks of theoretical credit charged per admitted event.
    #[inline]
    pub fn increment(&self) -> Ticks {
        self.increment
    }

    /// Tolerated slack in ticks.
    #[inline]
    pub fn limit(&self) -> Ticks {
        self.limit
    }
}

impl Default for Gcra {
    /// The zero contract: increment 0, limit `Ticks::MAX`. Time-based but
    /// unconstrained; admits everything and never alarms.
    fn default() -> Self {
        Self::new(0, Ticks::MAX)
    }
}

impl Throttle for Gcra {
    fn reset(&mut self, now: Ticks) {
        // Backdate the reference instant one increment so the first event
        // after a reset is always admissible.
        self.then.reset(now.saturating_sub(self.increment));
        self.credit.reset(0);
        self.alarmed.reset(false);
        self.approximate = false;
    }

    fn admissible(&mut self, now: Ticks) -> Ticks {
        let mut delay = 0;
        self.then.stage(now);
        self.alarmed.stage(false);
        let elapsed = now.saturating_sub(self.then.committed());
        if elapsed >= self.credit.committed() {
            // The credit has fully drained; the event is on or behind
            // schedule.
            self.credit.stage(0);
        } else {
            let credit = self.credit.committed() - elapsed;
            self.credit.stage(credit);
            if credit > self.limit {
                delay = credit - self.limit;
                self.alarmed.stage(true);
            }
        }
        delay
    }

    fn commit_many(&mut self, events: u64) -> bool {
        self.then.promote();
        let debit = if events > self.max_events {
            None
        } else {
            events.checked_mul(self.increment)
        };
        let credit = match debit.and_then(|debit| self.credit.tentative().checked_add(debit)) {
            Some(credit) => credit,
            None => {
                self.approximate = true;
                Ticks::MAX
            }
        };
        self.credit.settle(credit);
        self.alarmed.promote();
        !self.alarmed.committed()
    }

    fn rollback(&mut self) -> bool {
        !self.alarmed.committed()
    }

    #[inline]
    fn time(&self) -> Ticks {
        self.clock.now()
    }

    #[inline]
    fn frequency(&self) -> Ticks {
        self.clock.frequency()
    }

    #[inline]
    fn is_alarmed(&self) -> bool {
        self.alarmed.committed()
    }

    #[inline]
    fn is_approximate(&self) -> bool {
        self.approximate
    }
}
