use crate::{Error, Result};
use crossbeam_channel::Sender;
use std::thread::JoinHandle;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Per-worker value counts, indexed by worker id.
///
/// Entry `i` was produced by collector `i` alone. A `WorkerTallies` only
/// exists once every collector has been joined, so reading it needs no
/// further synchronization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct WorkerTallies(Vec<i64>);

impl WorkerTallies {
    /// Sum of every worker's tally.
    pub fn total(&self) -> i64 {
        self.0.iter().sum()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of workers that forwarded at least one value.
    pub fn active_workers(&self) -> usize {
        self.0.iter().filter(|&&t| t > 0).count()
    }
}

impl From<Vec<i64>> for WorkerTallies {
    fn from(tallies: Vec<i64>) -> Self {
        Self(tallies)
    }
}

/// Joins every collector, then closes the merged queue.
///
/// `merged` must be the last [`Sender`] not owned by a collector. It is
/// dropped only after the join barrier, so a receiver that sees the merged
/// queue close knows every tally is final.
///
/// Every collector is joined even if an earlier one panicked.
///
/// # Errors
///
/// Returns [`Error::TaskPanicked`] if any collector thread panicked.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn merge_controller(
    collectors: Vec<JoinHandle<i64>>,
    merged: Sender<i64>,
) -> Result<WorkerTallies> {
    let mut tallies = Vec::with_capacity(collectors.len());
    let mut panicked = false;

    for (_i, handle) in collectors.into_iter().enumerate() {
        match handle.join() {
            Ok(tally) => tallies.push(tally),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Collector {_i} panicked");
                tallies.push(0);
                panicked = true;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("All collectors joined, closing merged queue");
    drop(merged);

    if panicked {
        return Err(Error::TaskPanicked { task: "collector" });
    }
    Ok(WorkerTallies(tallies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector_loop;
    use crossbeam_channel::{bounded, unbounded};
    use std::thread;

    #[test]
    fn closes_merged_queue_only_after_every_collector() {
        let (merged_tx, merged_rx) = bounded(0);
        let mut sources = Vec::new();
        let mut handles = Vec::new();

        for id in 0..3 {
            let (tx, rx) = unbounded();
            sources.push(tx);
            let merged = merged_tx.clone();
            handles.push(thread::spawn(move || collector_loop(id, rx, merged)));
        }

        let merger = thread::spawn(move || merge_controller(handles, merged_tx));

        for (i, tx) in sources.iter().enumerate() {
            for v in 0..=i as i64 {
                tx.send(v).unwrap();
            }
        }
        drop(sources);

        let received = merged_rx.iter().count();
        let tallies = merger.join().unwrap().unwrap();

        assert_eq!(received, 6);
        assert_eq!(tallies.as_slice(), &[1, 2, 3]);
        assert_eq!(tallies.total(), 6);
        assert_eq!(tallies.active_workers(), 3);
    }

    #[test]
    fn panicking_collector_is_reported() {
        let (merged_tx, merged_rx) = bounded::<i64>(1);
        let ok = thread::spawn(|| 4_i64);
        let bad = thread::spawn(|| -> i64 { panic!("collector failure") });

        let result = merge_controller(vec![ok, bad], merged_tx);

        assert_eq!(result, Err(Error::TaskPanicked { task: "collector" }));
        assert!(merged_rx.recv().is_err());
    }

    #[test]
    fn tallies_helpers() {
        let tallies = WorkerTallies::from(vec![0, 3, 0, 2]);
        assert_eq!(tallies.len(), 4);
        assert!(!tallies.is_empty());
        assert_eq!(tallies.total(), 5);
        assert_eq!(tallies.active_workers(), 2);
        assert!(WorkerTallies::default().is_empty());
    }
}
