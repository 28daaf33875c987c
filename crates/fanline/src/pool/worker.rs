use core::time::Duration;
use crossbeam_channel::{Receiver, Sender};
use std::thread;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Worker loop: forwards each value from the shared `input` queue to the
/// worker's private `output` queue, then sleeps for `delay` before taking the
/// next one.
///
/// `input` is shared with every other worker, so each value reaches exactly
/// one of them. The loop ends when `input` is closed and drained, or when the
/// collector behind `output` is gone. Returning drops `output`, which closes
/// it.
///
/// # Arguments
///
/// - `_worker_id`: Index of this worker (used for logs/tracing).
/// - `input`: The queue shared by all workers.
/// - `output`: This worker's private queue.
/// - `delay`: Simulated processing time per value.
///
/// Returns the number of values forwarded.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(input, output)))]
pub fn worker_loop(
    _worker_id: usize,
    input: Receiver<i64>,
    output: Sender<i64>,
    delay: Duration,
) -> i64 {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} started");

    let mut forwarded = 0;

    for value in &input {
        if let Err(_e) = output.send(value) {
            #[cfg(feature = "tracing")]
            tracing::error!("Worker {_worker_id} lost its collector: {_e}");
            break;
        }
        forwarded += 1;

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} stopped after {forwarded} values");

    forwarded
}
