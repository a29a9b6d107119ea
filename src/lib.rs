//! Traffic-shaping throttles built on the Generic Cell Rate Algorithm.
//!
//! This crate provides a family of admission-control primitives that decide,
//! per event, whether an arrival complies with a configured rate contract:
//! network cells or packets, log messages, API calls, anything that needs to
//! be paced. The decision is advisory bookkeeping; the throttles never
//! sleep, never block, and never error.
//!
//! # Features
//!
//! - **GCRA core**: [`Gcra`] implements the continuous-state leaky bucket
//!   (virtual scheduling) algorithm with exact tick arithmetic and explicit
//!   overflow saturation.
//! - **Two-phase decisions**: every throttle supports peek-then-commit:
//!   [`admissible`](Throttle::admissible) speculatively tests an event, and
//!   the caller either [`commit`](Throttle::commit)s it or
//!   [`rollback`](Throttle::rollback)s the attempt without touching
//!   committed state.
//! - **Compound contracts**: [`CompoundThrottle`] combines a peak and a
//!   sustained leg into one decision; [`CellRateThrottle`] derives both legs
//!   from conventional ATM parameters (PCR, CDVT, SCR, MBS).
//! - **Backoff damping**: [`GeometricThrottle`] admits attempts 1, 2, 4,
//!   8, …, which keeps a repeating log message from flooding the output.
//! - **Keyed state**: [`ThrottleRegistry`] enforces one contract
//!   independently per client key, with lazy construction and stale-entry
//!   cleanup.
//!
//! # Caller protocol
//!
//! ```
//! use cell_ratelimit::{Gcra, Throttle};
//!
//! // One event per 2500 ticks, 5000 ticks of jitter tolerance.
//! let mut throttle = Gcra::new(2_500, 5_000);
//! throttle.reset(0);
//!
//! let mut now = 0;
//! let delay = throttle.admissible(now);
//! if delay == 0 {
//!     // Emit the event, then fold it into the throttle's state.
//!     assert!(throttle.commit());
//! } else {
//!     // Either wait at least `delay` ticks and retry, or give up.
//!     throttle.rollback();
//!     now += delay;
//!     assert_eq!(throttle.admissible(now), 0);
//! }
//! ```
//!
//! # Per-client contracts
//!
//! ```
//! use cell_ratelimit::{CellRateThrottle, ThrottleRegistry};
//!
//! // 1000 events/s peak, 100 events/s sustained, bursts of 50, per key.
//! let registry = ThrottleRegistry::new(
//!     CellRateThrottle::builder()
//!         .peak(1_000, 500)
//!         .sustained(100, 50),
//! );
//!
//! assert!(registry.try_admit("10.0.0.1").is_ok());
//! ```
//!
//! # Time
//!
//! Throttles are driven in integer ticks of a monotonic clock. Every
//! decision method takes an explicit `now`, so callers with their own time
//! source (or deterministic tests) pass tick values directly; the `*_now`
//! convenience methods read the throttle's own [`MonotonicClock`] instead.
//!
//! # Thread safety
//!
//! Throttle state is deliberately unsynchronized: methods take `&mut self`,
//! and one instance must not be mutated from two threads without an
//! external exclusive lock around each admissible/commit pair.
//! [`ThrottleRegistry`] provides exactly that per key via its shard-locked
//! map, which is the concurrent entry point most applications want.

mod builder;
mod cellrate;
mod clock;
mod compound;
mod error;
mod gcra;
mod geometric;
mod registry;
mod throttle;

// Public re-exports
pub use builder::ContractBuilder;
pub use cellrate::CellRateThrottle;
pub use clock::MonotonicClock;
pub use compound::CompoundThrottle;
pub use error::ThrottleError;
pub use gcra::Gcra;
pub use geometric::GeometricThrottle;
pub use registry::ThrottleRegistry;
pub use throttle::{NullThrottle, Throttle, Ticks};
