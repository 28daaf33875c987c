//! Error types for the pipeline.
//!
//! The three invariant violations are only ever produced once, after the
//! merged queue has closed and every value has been counted. They are terminal:
//! nothing in the pipeline retries.
//!
//! ## Error Cases
//! - `SumMismatch`: the collected sum differs from the generated sum.
//! - `CountMismatch`: the collected count differs from the generated count.
//! - `DistributionMismatch`: the per-worker tallies do not add up to the
//!   collected count.
//! - `InvalidConfig`: the pipeline was configured with values it cannot run.
//! - `TaskPanicked`: one of the pipeline threads panicked before finishing.
//! - `Spawn`: a pipeline thread could not be started.
//! - `LockPoisoned`: a thread panicked while holding a shared lock (std mutex
//!   only).

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the pipeline.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The number of values that reached the validator differs from the number
    /// the generator handed to the input queue.
    #[error("count mismatch: generated {generated} != collected {collected}")]
    CountMismatch { generated: i64, collected: i64 },

    /// The sum of the values that reached the validator differs from the sum
    /// the generator handed to the input queue.
    #[error("sum mismatch: generated {generated} != collected {collected}")]
    SumMismatch { generated: i64, collected: i64 },

    /// The per-worker tallies do not account for every collected value.
    #[error("distribution mismatch: tallied {tallied} != collected {collected}")]
    DistributionMismatch { tallied: i64, collected: i64 },

    /// The configuration was rejected before any thread was started.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A pipeline thread panicked, so its results cannot be trusted.
    #[error("{task} thread panicked")]
    TaskPanicked { task: &'static str },

    /// The OS refused to start a pipeline thread.
    #[error("failed to spawn thread: {context}")]
    Spawn { context: String },

    /// A shared lock was poisoned, so the counters it guards may be torn.
    #[error("lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` for the errors raised by the final conservation checks.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. }
                | Self::SumMismatch { .. }
                | Self::DistributionMismatch { .. }
        )
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::mutex::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
