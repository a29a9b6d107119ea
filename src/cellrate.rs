//! Cell rate throttling from conventional ATM traffic contract parameters.
//!
//! Contracts are expressed the way traffic engineers write them, as a peak
//! cell rate with a jitter tolerance and optionally a sustained cell rate
//! with a burst size, and lowered here into the GCRA increment/limit pairs
//! that actually enforce them.

use crate::builder::ContractBuilder;
use crate::compound::CompoundThrottle;
use crate::throttle::{Throttle, Ticks};

/// A [`CompoundThrottle`] whose legs are two [`Gcra`](crate::Gcra) instances
/// derived from ATM-style contract parameters:
///
/// - PCR: peak cell rate, in events per second.
/// - CDVT: cell delay variation tolerance, in microseconds.
/// - SCR: sustained cell rate, in events per second.
/// - MBS: maximum burst size, in events.
///
/// The peak leg polices PCR/CDVT, the sustained leg polices SCR/MBS. Driving
/// events through the combined throttle enforces both at once.
///
/// # Example
///
/// ```
/// use cell_ratelimit::{CellRateThrottle, Throttle};
///
/// // 1000 events/s peak, 500 events/s sustained, bursts of up to 10,
/// // policed at microsecond resolution.
/// let mut throttle = CellRateThrottle::builder()
///     .frequency(1_000_000)
///     .peak(1_000, 0)
///     .sustained(500, 10)
///     .build();
///
/// // Events at the sustained spacing of 2000 ticks always conform.
/// throttle.reset(0);
/// for i in 0..100u64 {
///     assert_eq!(throttle.admissible(i * 2_000), 0);
///     assert!(throttle.commit());
/// }
/// ```
#[derive(Debug)]
pub struct CellRateThrottle {
    inner: CompoundThrottle,
}

impl CellRateThrottle {
    /// Start building a contract, including non-default tick frequencies and
    /// sustained legs.
    #[must_use]
    pub fn builder() -> ContractBuilder {
        ContractBuilder::new()
    }

    /// A peak-only contract at nanosecond resolution: PCR in events per
    /// second, CDVT in microseconds. The sustained leg admits everything.
    pub fn new(pcr: Ticks, cdvt: Ticks) -> Self {
        Self::builder().peak(pcr, cdvt).build()
    }

    /// A dual contract at nanosecond resolution: PCR/CDVT for the peak leg,
    /// SCR in events per second and MBS in events for the sustained leg.
    pub fn with_sustained(pcr: Ticks, cdvt: Ticks, scr: Ticks, mbs: Ticks) -> Self {
        Self::builder().peak(pcr, cdvt).sustained(scr, mbs).build()
    }

    pub(crate) fn from_compound(inner: CompoundThrottle) -> Self {
        Self { inner }
    }

    /// The peak-leg GCRA increment: ⌈frequency / pcr⌉ ticks per event, or
    /// `Ticks::MAX` for a zero rate (which admits nothing beyond the
    /// post-reset freebie).
    pub fn peak_increment(frequency: Ticks, pcr: Ticks) -> Ticks {
        if pcr == 0 {
            Ticks::MAX
        } else {
            frequency.div_ceil(pcr)
        }
    }

    /// The peak-leg GCRA limit: CDVT microseconds converted to ticks,
    /// truncating.
    pub fn peak_limit(frequency: Ticks, cdvt: Ticks) -> Ticks {
        frequency.saturating_mul(cdvt) / 1_000_000
    }

    /// The sustained-leg GCRA increment: ⌈frequency / scr⌉ ticks per event,
    /// or `Ticks::MAX` for a zero rate.
    pub fn sustained_increment(frequency: Ticks, scr: Ticks) -> Ticks {
        if scr == 0 {
            Ticks::MAX
        } else {
            frequency.div_ceil(scr)
        }
    }

    /// The sustained-leg GCRA limit: the peak limit plus the burst
    /// allowance (MBS − 1) × (sustained increment − peak increment).
    ///
    /// The burst term only applies when MBS exceeds one event and the peak
    /// leg is both constrained and genuinely faster than the sustained leg;
    /// degenerate contracts (no burst, zero peak rate, sustained configured
    /// at or above peak) get the bare peak limit.
    pub fn sustained_limit(
        frequency: Ticks,
        pcr: Ticks,
        cdvt: Ticks,
        scr: Ticks,
        mbs: Ticks,
    ) -> Ticks {
        let peak_increment = Self::peak_increment(frequency, pcr);
        let sustained_increment = Self::sustained_increment(frequency, scr);
        let mut limit = Self::peak_limit(frequency, cdvt);
        if mbs > 1 && peak_increment > 0 && peak_increment < sustained_increment {
            let burst = (mbs - 1).saturating_mul(sustained_increment - peak_increment);
            limit = limit.saturating_add(burst);
        }
        limit
    }
}

impl Default for CellRateThrottle {
    /// The null contract: both legs unconstrained, every event admissible.
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Throttle for CellRateThrottle {
    fn reset(&mut self, now: Ticks) {
        self.inner.reset(now);
    }

    fn admissible(&mut self, now: Ticks) -> Ticks {
        self.inner.admissible(now)
    }

    fn commit_many(&mut self, events: u64) -> bool {
        self.inner.commit_many(events)
    }

    fn rollback(&mut self) -> bool {
        self.inner.rollback()
    }

    fn time(&self) -> Ticks {
        self.inner.time()
    }

    fn frequency(&self) -> Ticks {
        self.inner.frequency()
    }

    fn is_alarmed(&self) -> bool {
        self.inner.is_alarmed()
    }

    fn is_approximate(&self) -> bool {
        self.inner.is_approximate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MHZ: Ticks = 1_000_000;

    #[test]
    fn test_peak_increment_rounds_up() {
        assert_eq!(CellRateThrottle::peak_increment(MHZ, 1_000), 1_000);
        assert_eq!(CellRateThrottle::peak_increment(MHZ, 3_000), 334);
        assert_eq!(CellRateThrottle::peak_increment(1_000_000_000, 1), 1_000_000_000);
    }

    #[test]
    fn test_zero_rates_never_divide() {
        assert_eq!(CellRateThrottle::peak_increment(MHZ, 0), Ticks::MAX);
        assert_eq!(CellRateThrottle::sustained_increment(MHZ, 0), Ticks::MAX);
    }

    #[test]
    fn test_peak_limit_converts_microseconds_truncating() {
        assert_eq!(CellRateThrottle::peak_limit(MHZ, 0), 0);
        assert_eq!(CellRateThrottle::peak_limit(MHZ, 250), 250);
        // At 1 kHz a 999 microsecond tolerance truncates to zero ticks.
        assert_eq!(CellRateThrottle::peak_limit(1_000, 999), 0);
    }

    #[test]
    fn test_sustained_limit_adds_burst_allowance() {
        // PCR 1000/s, SCR 500/s, MBS 10 at 1 MHz: 9 extra events of
        // 1000 ticks of headroom each.
        assert_eq!(
            CellRateThrottle::sustained_limit(MHZ, 1_000, 0, 500, 10),
            9_000
        );
        assert_eq!(
            CellRateThrottle::sustained_limit(MHZ, 1_000, 250, 500, 10),
            9_250
        );
    }

    #[test]
    fn test_sustained_limit_omits_burst_for_degenerate_contracts() {
        // MBS of one event: no burst beyond the peak tolerance.
        assert_eq!(CellRateThrottle::sustained_limit(MHZ, 1_000, 0, 500, 1), 0);
        // Zero peak rate: increment saturates, burst term is dropped.
        assert_eq!(CellRateThrottle::sustained_limit(MHZ, 0, 0, 500, 10), 0);
        // Sustained configured at the peak rate: nothing to tolerate.
        assert_eq!(
            CellRateThrottle::sustained_limit(MHZ, 1_000, 0, 1_000, 10),
            0
        );
        // Sustained configured faster than peak: permissive, term dropped.
        assert_eq!(
            CellRateThrottle::sustained_limit(MHZ, 500, 0, 1_000, 10),
            0
        );
    }

    #[test]
    fn test_default_contract_admits_everything() {
        let mut throttle = CellRateThrottle::default();
        throttle.reset(0);
        for now in [0, 0, 1, 2, 1_000] {
            assert_eq!(throttle.admissible(now), 0);
            assert!(throttle.commit());
        }
        assert!(!throttle.is_alarmed());
    }

    #[test]
    fn test_peak_only_contract_polices_peak_spacing() {
        let mut throttle = CellRateThrottle::builder()
            .frequency(MHZ)
            .peak(1_000, 0)
            .build();
        throttle.reset(0);

        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.commit());
        assert_eq!(throttle.admissible(500), 500);
        assert!(!throttle.commit());
        assert!(throttle.is_alarmed());
    }

    #[test]
    fn test_dual_contract_sustained_leg_exhausts_burst() {
        let mut throttle = CellRateThrottle::builder()
            .frequency(MHZ)
            .peak(1_000, 0)
            .sustained(500, 10)
            .build();
        throttle.reset(0);

        // Peak spacing of 1000 ticks overdrives the sustained leg by 1000
        // ticks per event; the 9000-tick allowance covers ten events.
        for i in 0..10u64 {
            assert_eq!(throttle.admissible(i * 1_000), 0, "event {i} in burst");
            assert!(throttle.commit());
        }
        assert_eq!(throttle.admissible(10_000), 1_000);
        assert!(!throttle.commit());
        assert!(throttle.is_alarmed());
    }

    #[test]
    fn test_contract_frequency_reaches_the_legs() {
        let throttle = CellRateThrottle::builder().frequency(MHZ).peak(1_000, 0).build();
        assert_eq!(throttle.frequency(), MHZ);
    }
}
