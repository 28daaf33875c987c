use crate::{Phase, Report, Totals, WorkerTallies};
use crossbeam_channel::Receiver;

/// End-of-pipeline consumer that counts what came out of the merged queue.
///
/// A `Validator` is fed either one value at a time through
/// [`Validator::observe`] or in bulk through [`Validator::drain`]. Once the
/// merged queue has closed, [`Validator::finish`] pairs its totals with the
/// generator's and the per-worker tallies into a [`Report`].
#[derive(Debug, Default)]
pub struct Validator {
    collected: Totals,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn observe(&mut self, value: i64) {
        self.collected.record(value);
    }

    /// Consumes `merged` until it is closed and empty.
    pub fn drain(&mut self, merged: &Receiver<i64>) {
        for value in merged {
            self.observe(value);
        }
    }

    /// Totals observed so far.
    pub const fn collected(&self) -> Totals {
        self.collected
    }

    /// Builds the run's [`Report`] at [`Phase::Merged`]. Call
    /// [`Report::check`] on it to validate.
    pub fn finish(self, generated: Totals, tallies: WorkerTallies) -> Report {
        Report {
            generated,
            collected: self.collected,
            tallies,
            phase: Phase::Merged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crossbeam_channel::unbounded;

    #[test]
    fn drains_until_closed() {
        let (tx, rx) = unbounded();
        for v in 1..=4 {
            tx.send(v).unwrap();
        }
        drop(tx);

        let mut validator = Validator::new();
        validator.observe(5);
        validator.drain(&rx);
        assert_eq!(validator.collected(), Totals::new(5, 15));
    }

    #[test]
    fn finish_detects_lost_value() {
        let mut validator = Validator::new();
        validator.observe(1);
        validator.observe(3);

        let report = validator.finish(Totals::new(3, 6), vec![1, 1].into());
        assert_eq!(report.phase, Phase::Merged);
        assert_eq!(
            report.check(),
            Err(Error::SumMismatch {
                generated: 6,
                collected: 4
            })
        );
    }
}
