//! Wiring of the generate, fan-out, fan-in, validate pipeline.
//!
//! [`Pipeline::start`] spawns one thread per stage:
//!
//! ```text
//! generator -> input queue -> worker 0..N -> private queues -> collector 0..N
//!           -> merged queue -> validator (caller thread)
//! ```
//!
//! plus a merge controller that joins the collectors and closes the merged
//! queue. Only the generator observes the deadline. Every other stage stops
//! because its upstream queue closed, so nothing accepted by the input queue is
//! ever dropped.

use crate::{
    Accountant, Canceller, Error, Phase, PipelineConfig, Report, Reporter, Result, RunContext,
    Totals, Validator, WorkerTallies, collector_loop, generate, merge_controller, worker_loop,
};
use crossbeam_channel::{Receiver, bounded};
use std::sync::Arc;
use std::thread::{self, JoinHandle};


/// A configured, not yet started pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails
    /// [`PipelineConfig::validate`].
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Spawns every stage and returns a handle to the merged output.
    ///
    /// Consumers are started before producers: workers and collectors exist
    /// before the merge controller, and the generator comes last, so its time
    /// budget starts only once something can take its values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if a thread cannot be started. Threads that
    /// were already running wind down on their own once the returned error
    /// drops the last queue handles.
    pub fn start(&self) -> Result<RunningPipeline> {
        let config = &self.config;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting pipeline with {} workers for {:?}",
            config.worker_count,
            config.run_duration
        );

        let accountant = Arc::new(Accountant::new());
        let (input_tx, input_rx) = bounded(config.input_queue_capacity);
        let (merged_tx, merged_rx) = bounded(config.merged_queue_capacity);

        let mut workers = Vec::with_capacity(config.worker_count);
        let mut collectors = Vec::with_capacity(config.worker_count);

        for worker_id in 0..config.worker_count {
            let (out_tx, out_rx) = bounded(config.worker_queue_capacity);

            let input = input_rx.clone();
            let delay = config.worker_delay;
            workers.push(spawn(format!("fanline-worker-{worker_id}"), move || {
                worker_loop(worker_id, input, out_tx, delay)
            })?);

            let merged = merged_tx.clone();
            collectors.push(spawn(format!("fanline-collector-{worker_id}"), move || {
                collector_loop(worker_id, out_rx, merged)
            })?);
        }
        // Only workers may hold the receiving side, otherwise the input queue
        // would never report them all gone.
        drop(input_rx);

        let merger = spawn("fanline-merger".to_string(), move || {
            merge_controller(collectors, merged_tx)
        })?;

        let (ctx, canceller) = RunContext::with_timeout(config.run_duration);
        let generator = {
            let accountant = Arc::clone(&accountant);
            spawn("fanline-generator".to_string(), move || {
                generate(&ctx, input_tx, &*accountant)
            })?
        };

        Ok(RunningPipeline {
            accountant,
            canceller,
            merged: merged_rx,
            generator,
            workers,
            merger,
            validator: Validator::new(),
            phase: Phase::Running,
        })
    }

    /// Runs the pipeline to completion on the calling thread.
    ///
    /// # Errors
    ///
    /// See [`RunningPipeline::finish`].
    pub fn run(&self) -> Result<Report> {
        self.start()?.finish()
    }

    /// Like [`Pipeline::run`], but hands the outcome to `reporter`.
    ///
    /// # Errors
    ///
    /// See [`RunningPipeline::finish_with`].
    pub fn run_with_reporter<R>(&self, reporter: &R) -> Result<Report>
    where
        R: Reporter + ?Sized,
    {
        match self.start() {
            Ok(running) => running.finish_with(reporter),
            Err(e) => {
                reporter.fatal(&e);
                Err(e)
            }
        }
    }
}

/// A started pipeline. The caller thread acts as the validator.
///
/// Dropping a `RunningPipeline` without finishing it closes the merged queue
/// and, unless a [`Canceller`] clone is still alive elsewhere, cancels the
/// generator. Every stage thread then exits on its own.
#[derive(Debug)]
pub struct RunningPipeline {
    accountant: Arc<Accountant>,
    canceller: Canceller,
    merged: Receiver<i64>,
    generator: JoinHandle<i64>,
    workers: Vec<JoinHandle<i64>>,
    merger: JoinHandle<Result<WorkerTallies>>,
    validator: Validator,
    phase: Phase,
}

impl RunningPipeline {
    /// Handle that stops the generator before its deadline.
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Stops the generator now. In-flight values still drain.
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Current phase. `Draining` is reported as soon as the generator thread
    /// has exited.
    pub fn phase(&self) -> Phase {
        if self.phase == Phase::Running && self.generator.is_finished() {
            Phase::Draining
        } else {
            self.phase
        }
    }

    /// Generator totals so far. Final only once the phase is past `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the generator panicked while
    /// recording a value.
    pub fn generated(&self) -> Result<Totals> {
        self.accountant.totals()
    }

    /// Totals of the values taken from the merged queue so far.
    pub const fn collected(&self) -> Totals {
        self.validator.collected()
    }

    /// Takes the next value from the merged queue, blocking until one is
    /// available. Returns `None` once the merged queue has closed.
    ///
    /// Every value returned here is already counted by the validator.
    pub fn recv(&mut self) -> Option<i64> {
        if let Ok(value) = self.merged.recv() {
            self.validator.observe(value);
            let phase = self.phase();
            self.phase.advance(phase);
            Some(value)
        } else {
            self.phase.advance(Phase::Merged);
            None
        }
    }

    /// Drains the merged queue, joins every stage, and validates the run.
    ///
    /// # Errors
    ///
    /// - [`Error::TaskPanicked`] if any pipeline thread panicked.
    /// - [`Error::LockPoisoned`] if the generator's totals cannot be read.
    /// - [`Error::SumMismatch`], [`Error::CountMismatch`], or
    ///   [`Error::DistributionMismatch`] if a conservation invariant failed.
    pub fn finish(self) -> Result<Report> {
        self.finish_with(&Silent)
    }

    /// Like [`RunningPipeline::finish`], but hands the report and any fatal
    /// error to `reporter`.
    ///
    /// # Errors
    ///
    /// See [`RunningPipeline::finish`].
    pub fn finish_with<R>(mut self, reporter: &R) -> Result<Report>
    where
        R: Reporter + ?Sized,
    {
        self.validator.drain(&self.merged);

        let Self {
            accountant,
            canceller: _canceller,
            merged: _,
            generator,
            workers,
            merger,
            validator,
            phase: _,
        } = self;

        // The merged queue is closed, so every stage has already returned and
        // these joins do not block.
        let joined = merger
            .join()
            .unwrap_or_else(|_| Err(Error::TaskPanicked { task: "merger" }))
            .and_then(|tallies| {
                let (emitted, forwarded) = join_stages(generator, workers)?;
                let generated = accountant.totals()?;
                debug_assert_eq!(emitted, generated.count, "generator and accountant disagree");
                debug_assert_eq!(forwarded, tallies, "a worker lane lost values");
                Ok(validator.finish(generated, tallies))
            });

        conclude(joined, reporter)
    }
}

/// Validates a drained run and hands the outcome to `reporter`.
///
/// A run that could not be drained (`joined` is an error) only reaches
/// [`Reporter::fatal`]. Otherwise the report is handed to [`Reporter::report`]
/// at [`Phase::Validated`] whatever the check found, followed by
/// [`Reporter::fatal`] if an invariant was violated. The returned report is
/// [`Phase::Terminal`].
fn conclude<R>(joined: Result<Report>, reporter: &R) -> Result<Report>
where
    R: Reporter + ?Sized,
{
    let mut report = match joined {
        Ok(report) => report,
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::error!("Pipeline aborted: {e}");
            reporter.fatal(&e);
            return Err(e);
        }
    };

    let checked = report.check();
    report.phase.advance(Phase::Validated);
    reporter.report(&report);
    report.phase.advance(Phase::Terminal);

    match checked {
        Ok(()) => {
            #[cfg(feature = "tracing")]
            tracing::info!("Pipeline validated {} values", report.collected.count);
            Ok(report)
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::error!("Pipeline validation failed: {e}");
            reporter.fatal(&e);
            Err(e)
        }
    }
}

/// Joins the generator and every worker. Returns how many values the generator
/// emitted and how many each worker forwarded.
fn join_stages(
    generator: JoinHandle<i64>,
    workers: Vec<JoinHandle<i64>>,
) -> Result<(i64, WorkerTallies)> {
    let emitted = generator.join();

    let mut forwarded = Vec::with_capacity(workers.len());
    let mut panicked = false;
    for worker in workers {
        match worker.join() {
            Ok(count) => forwarded.push(count),
            Err(_) => panicked = true,
        }
    }

    let emitted = emitted.map_err(|_| Error::TaskPanicked { task: "generator" })?;
    if panicked {
        return Err(Error::TaskPanicked { task: "worker" });
    }
    Ok((emitted, forwarded.into()))
}

struct Silent;

impl Reporter for Silent {
    fn report(&self, _report: &Report) {}

    fn fatal(&self, _error: &Error) {}
}

fn spawn<T, F>(name: String, f: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .map_err(|e| Error::Spawn {
            context: format!("{name}: {e}"),
        })
}
