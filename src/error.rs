//! Error types for admission control.
//!
//! The throttle protocol itself has no failure modes; non-compliance is a
//! nonzero delay, never an error. The registry surface converts a rejection
//! into an error value for callers that want `Result`-shaped admission.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by [`ThrottleRegistry`](crate::ThrottleRegistry).
#[derive(Debug, Error)]
pub enum ThrottleError {
    /// The event exceeds the traffic contract and the caller should wait at
    /// least this long before retrying.
    #[error("traffic contract exceeded, retry after {0:?}")]
    Throttled(Duration),
}

impl ThrottleError {
    /// The advisory wait before the rejected event would comply.
    pub fn retry_after(&self) -> Duration {
        match self {
            Self::Throttled(duration) => *duration,
        }
    }
}
