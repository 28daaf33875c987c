use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use fanline::PipelineConfig;

/// Runtime configuration for the `fanline` binary.
///
/// Every value can be given as a CLI flag or an environment variable (a `.env`
/// file is loaded first). Defaults reproduce the reference run: five workers,
/// one second of generation, a one millisecond delay per value, and
/// rendezvous queues everywhere except the merged queue.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fanline",
    version,
    about = "Runs a generate / fan-out / fan-in pipeline and validates that nothing was lost"
)]
pub struct CliArgs {
    /// How long the generator produces values, in milliseconds.
    ///
    /// Environment variable: `RUN_DURATION_MS`
    #[arg(long, env = "RUN_DURATION_MS", default_value_t = 1_000)]
    pub run_duration_ms: u64,

    /// Number of worker/collector pairs. Must be at least 1.
    ///
    /// Environment variable: `WORKER_COUNT`
    #[arg(long, env = "WORKER_COUNT", default_value_t = 5)]
    pub worker_count: usize,

    /// Pause each worker takes after forwarding a value, in milliseconds.
    ///
    /// Environment variable: `WORKER_DELAY_MS`
    #[arg(long, env = "WORKER_DELAY_MS", default_value_t = 1)]
    pub worker_delay_ms: u64,

    /// Capacity of the merged output queue. Defaults to the worker count.
    ///
    /// Environment variable: `MERGED_QUEUE_CAPACITY`
    #[arg(long, env = "MERGED_QUEUE_CAPACITY")]
    pub merged_queue_capacity: Option<usize>,

    /// Capacity of the shared input queue. `0` means a rendezvous handoff.
    ///
    /// Environment variable: `INPUT_QUEUE_CAPACITY`
    #[arg(long, env = "INPUT_QUEUE_CAPACITY", default_value_t = 0)]
    pub input_queue_capacity: usize,

    /// Capacity of each worker's private output queue. `0` means a rendezvous
    /// handoff.
    ///
    /// Environment variable: `WORKER_QUEUE_CAPACITY`
    #[arg(long, env = "WORKER_QUEUE_CAPACITY", default_value_t = 0)]
    pub worker_queue_capacity: usize,

    /// Print the final report as a single JSON document instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl TryFrom<&CliArgs> for PipelineConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self, Self::Error> {
        if args.worker_count == 0 {
            bail!("WORKER_COUNT must be greater than 0");
        }

        Ok(Self {
            run_duration: Duration::from_millis(args.run_duration_ms),
            worker_count: args.worker_count,
            worker_delay: Duration::from_millis(args.worker_delay_ms),
            merged_queue_capacity: args.merged_queue_capacity.unwrap_or(args.worker_count),
            input_queue_capacity: args.input_queue_capacity,
            worker_queue_capacity: args.worker_queue_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("fanline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_library_defaults() {
        let config = PipelineConfig::try_from(&parse(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--run-duration-ms",
            "250",
            "--worker-count",
            "8",
            "--worker-delay-ms",
            "0",
            "--input-queue-capacity",
            "16",
            "--json",
        ]);
        assert!(args.json);

        let config = PipelineConfig::try_from(&args).unwrap();
        assert_eq!(config.run_duration, Duration::from_millis(250));
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.worker_delay, Duration::ZERO);
        assert_eq!(config.merged_queue_capacity, 8);
        assert_eq!(config.input_queue_capacity, 16);
        assert_eq!(config.worker_queue_capacity, 0);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let args = parse(&["--worker-count", "0"]);
        assert!(PipelineConfig::try_from(&args).is_err());
    }
}
