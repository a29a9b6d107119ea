//! Attempt-counted geometric backoff.

use crate::throttle::{Throttle, Ticks, TwoPhase};

/// A throttle that admits on attempts 1, 2, 4, 8, 16, … and refuses every
/// attempt in between.
///
/// Unlike the rate throttles this one is not time-based at all: `now` is
/// ignored, `time()` and `frequency()` are 0, and the only thing that
/// matters is how many attempts have been made. The classic use is damping a
/// recurring log or error message so that it is emitted with geometrically
/// decreasing frequency instead of flooding the output.
///
/// Every attempt advances the counters, whether it ends in
/// [`commit`](Throttle::commit) or [`rollback`](Throttle::rollback); the two
/// differ only in whether the alarm state is updated. The event count passed
/// to [`commit_many`](Throttle::commit_many) is ignored, because only the
/// fact that an attempt occurred matters.
///
/// # Example
///
/// ```
/// use cell_ratelimit::{GeometricThrottle, Throttle};
///
/// let mut damper = GeometricThrottle::new();
/// let mut emitted = 0;
/// for _ in 0..32 {
///     if damper.admissible_now() == 0 {
///         emitted += 1; // log the message
///     }
///     damper.commit();
/// }
/// assert_eq!(emitted, 6); // attempts 1, 2, 4, 8, 16, 32
/// ```
#[derive(Debug, Clone)]
pub struct GeometricThrottle {
    /// The doubling threshold: how many consecutive attempts the current
    /// cycle spans.
    consecutive: TwoPhase<u64>,
    /// Attempts remaining until the next admission.
    countdown: TwoPhase<u64>,
    alarmed: TwoPhase<bool>,
}

impl GeometricThrottle {
    /// A fresh throttle; the first attempt is admissible.
    pub fn new() -> Self {
        Self {
            consecutive: TwoPhase::new(1),
            countdown: TwoPhase::new(1),
            alarmed: TwoPhase::new(false),
        }
    }
}

impl Default for GeometricThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl Throttle for GeometricThrottle {
    fn reset(&mut self, _now: Ticks) {
        self.consecutive.reset(1);
        self.countdown.reset(1);
        self.alarmed.reset(false);
    }

    fn admissible(&mut self, _now: Ticks) -> Ticks {
        let mut delay = 0;
        let mut consecutive = self.consecutive.committed();
        let mut countdown = self.countdown.committed().saturating_sub(1);
        if countdown == 0 {
            let was = consecutive;
            // Doubling saturates rather than wraps; once it pegs at the
            // maximum the countdown becomes astronomically large and the
            // throttle effectively stops admitting.
            consecutive = consecutive.saturating_mul(2);
            countdown = consecutive - was;
            self.alarmed.stage(false);
        } else {
            delay = Ticks::MAX;
            self.alarmed.stage(true);
        }
        self.consecutive.stage(consecutive);
        self.countdown.stage(countdown);
        delay
    }

    fn commit_many(&mut self, _events: u64) -> bool {
        self.alarmed.promote();
        self.rollback()
    }

    fn rollback(&mut self) -> bool {
        self.consecutive.promote();
        self.countdown.promote();
        !self.alarmed.committed()
    }

    #[inline]
    fn is_alarmed(&self) -> bool {
        self.alarmed.committed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_on_powers_of_two_attempts() {
        let mut throttle = GeometricThrottle::new();
        let mut admitted = Vec::new();
        for attempt in 1..=32u64 {
            if throttle.admissible(0) == 0 {
                admitted.push(attempt);
            }
            throttle.commit();
        }
        assert_eq!(admitted, [1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn test_refused_attempts_report_maximum_delay() {
        let mut throttle = GeometricThrottle::new();
        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.commit());
        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.commit());

        // Attempt 3 is refused.
        assert_eq!(throttle.admissible(0), Ticks::MAX);
        assert!(!throttle.commit());
        assert!(throttle.is_alarmed());

        // Attempt 4 is admitted and clears the alarm.
        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.commit());
        assert!(!throttle.is_alarmed());
    }

    #[test]
    fn test_rolled_back_attempts_still_count() {
        let mut throttle = GeometricThrottle::new();
        // Attempts 1 and 2, both rolled back: the counters advance anyway.
        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.rollback());
        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.rollback());

        // Attempt 3 is refused, exactly as if the first two had committed.
        assert_eq!(throttle.admissible(0), Ticks::MAX);
        assert!(throttle.rollback(), "rollback leaves the alarm untouched");
        assert!(!throttle.is_alarmed());
    }

    #[test]
    fn test_reset_restores_the_first_freebie() {
        let mut throttle = GeometricThrottle::new();
        for _ in 0..5 {
            throttle.admissible(0);
            throttle.commit();
        }
        throttle.reset(0);
        assert_eq!(throttle.admissible(0), 0);
        assert!(throttle.commit());
        assert!(!throttle.is_alarmed());
    }

    #[test]
    fn test_not_time_based() {
        let throttle = GeometricThrottle::new();
        assert_eq!(throttle.time(), 0);
        assert_eq!(throttle.frequency(), 0);
        assert!(!throttle.is_approximate());
    }
}
