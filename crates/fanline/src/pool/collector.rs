use crossbeam_channel::{Receiver, Sender};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Drains one worker's private queue into the merged queue.
///
/// Values are forwarded in the order they arrive, and the collector counts
/// each one. The count is owned by this thread alone and handed back through
/// the return value, so it only becomes visible to others once the thread is
/// joined.
///
/// Stops when `source` is closed and drained, or when the merged queue has no
/// receiver left. Returns the number of values forwarded.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(source, merged)))]
pub fn collector_loop(_worker_id: usize, source: Receiver<i64>, merged: Sender<i64>) -> i64 {
    let mut tally = 0;

    for value in &source {
        if let Err(_e) = merged.send(value) {
            #[cfg(feature = "tracing")]
            tracing::error!("Collector {_worker_id} lost the merged queue: {_e}");
            break;
        }
        tally += 1;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Collector {_worker_id} finished with tally {tally}");

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn tallies_and_forwards_in_order() {
        let (src_tx, src_rx) = unbounded();
        let (merged_tx, merged_rx) = unbounded();

        for v in [5, 7, 11] {
            src_tx.send(v).unwrap();
        }
        drop(src_tx);

        assert_eq!(collector_loop(2, src_rx, merged_tx), 3);
        assert_eq!(merged_rx.iter().collect::<Vec<_>>(), vec![5, 7, 11]);
    }

    #[test]
    fn empty_source_yields_zero_tally() {
        let (src_tx, src_rx) = unbounded::<i64>();
        let (merged_tx, merged_rx) = unbounded();
        drop(src_tx);

        assert_eq!(collector_loop(0, src_rx, merged_tx), 0);
        assert!(merged_rx.recv().is_err());
    }
}
