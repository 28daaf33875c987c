use crate::{Error, Result};
use core::time::Duration;

/// Tunables for a single pipeline run.
///
/// A capacity of `0` makes the corresponding queue a rendezvous channel: every
/// send blocks until a receiver takes the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Time budget after which the generator stops producing.
    pub run_duration: Duration,
    /// Number of worker/collector pairs.
    pub worker_count: usize,
    /// Pause each worker takes after forwarding a value.
    pub worker_delay: Duration,
    /// Capacity of the queue the collectors merge into.
    pub merged_queue_capacity: usize,
    /// Capacity of the shared queue between the generator and the workers.
    pub input_queue_capacity: usize,
    /// Capacity of each worker's private output queue.
    pub worker_queue_capacity: usize,
}

impl PipelineConfig {
    pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(1);
    pub const DEFAULT_WORKER_COUNT: usize = 5;
    pub const DEFAULT_WORKER_DELAY: Duration = Duration::from_millis(1);

    /// Rejects configurations the pipeline cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `worker_count` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::InvalidConfig {
                reason: "worker_count must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run_duration: Self::DEFAULT_RUN_DURATION,
            worker_count: Self::DEFAULT_WORKER_COUNT,
            worker_delay: Self::DEFAULT_WORKER_DELAY,
            merged_queue_capacity: Self::DEFAULT_WORKER_COUNT,
            input_queue_capacity: 0,
            worker_queue_capacity: 0,
        }
    }
}
