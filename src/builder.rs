//! Builder API for configuring traffic contracts.

use crate::cellrate::CellRateThrottle;
use crate::clock::MonotonicClock;
use crate::compound::CompoundThrottle;
use crate::gcra::Gcra;
use crate::throttle::{NullThrottle, Throttle, Ticks};

/// Builder for a [`CellRateThrottle`] traffic contract.
///
/// A contract is a tick frequency plus up to two legs:
///
/// - `peak(pcr, cdvt)`: peak cell rate in events per second and cell delay
///   variation tolerance in microseconds.
/// - `sustained(scr, mbs)`: sustained cell rate in events per second and
///   maximum burst size in events.
///
/// Legs that are not configured admit everything; a builder with no legs at
/// all produces the null contract. Degenerate parameter values are given
/// meaning rather than rejected: a zero rate derives a `Ticks::MAX`
/// increment (a leg that blocks all traffic after the post-reset freebie),
/// and a zero tolerance or burst size simply derives a zero limit.
///
/// # Example
///
/// ```
/// use cell_ratelimit::CellRateThrottle;
///
/// let throttle = CellRateThrottle::builder()
///     .frequency(1_000_000)   // police in microsecond ticks
///     .peak(1_000, 250)       // 1000 events/s, 250 us jitter tolerance
///     .sustained(500, 10)     // 500 events/s sustained, bursts of 10
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    pub(crate) frequency: Ticks,
    pub(crate) peak: Option<(Ticks, Ticks)>,
    pub(crate) sustained: Option<(Ticks, Ticks)>,
}

impl ContractBuilder {
    /// A builder for the null contract at nanosecond resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick frequency the contract is policed at, in ticks per
    /// second.
    ///
    /// # Panics
    ///
    /// Panics if `ticks_per_second` is 0.
    #[must_use]
    pub fn frequency(mut self, ticks_per_second: Ticks) -> Self {
        assert!(ticks_per_second > 0, "frequency must be greater than 0");
        self.frequency = ticks_per_second;
        self
    }

    /// Configure the peak leg: PCR in events per second, CDVT in
    /// microseconds.
    #[must_use]
    pub fn peak(mut self, pcr: Ticks, cdvt: Ticks) -> Self {
        self.peak = Some((pcr, cdvt));
        self
    }

    /// Configure the sustained leg: SCR in events per second, MBS in
    /// events.
    #[must_use]
    pub fn sustained(mut self, scr: Ticks, mbs: Ticks) -> Self {
        self.sustained = Some((scr, mbs));
        self
    }

    /// Derive the GCRA legs and build the throttle, reset at its clock's
    /// epoch.
    #[must_use]
    pub fn build(self) -> CellRateThrottle {
        let clock = MonotonicClock::with_frequency(self.frequency);
        let frequency = clock.frequency();
        // Sustained-leg derivation needs the peak parameters even when the
        // peak leg itself is absent; absent reads as unconstrained.
        let (pcr, cdvt) = self.peak.unwrap_or((0, 0));

        let peak_leg: Box<dyn Throttle> = match self.peak {
            Some((pcr, cdvt)) => Box::new(Gcra::with_clock(
                CellRateThrottle::peak_increment(frequency, pcr),
                CellRateThrottle::peak_limit(frequency, cdvt),
                clock,
            )),
            // The peak leg stays time-based even when unconstrained; it is
            // the compound's canonical clock.
            None => Box::new(Gcra::with_clock(0, Ticks::MAX, clock)),
        };
        let sustained_leg: Box<dyn Throttle> = match (self.peak, self.sustained) {
            (_, Some((scr, mbs))) => Box::new(Gcra::with_clock(
                CellRateThrottle::sustained_increment(frequency, scr),
                CellRateThrottle::sustained_limit(frequency, pcr, cdvt, scr, mbs),
                clock,
            )),
            (Some(_), None) => Box::new(NullThrottle),
            (None, None) => Box::new(Gcra::with_clock(0, Ticks::MAX, clock)),
        };

        let mut inner = CompoundThrottle::with_legs(peak_leg, sustained_leg);
        let now = clock.now();
        inner.reset(now);
        CellRateThrottle::from_compound(inner)
    }
}

impl Default for ContractBuilder {
    fn default() -> Self {
        Self {
            frequency: MonotonicClock::NANOS_PER_SEC,
            peak: None,
            sustained: None,
        }
    }
}
