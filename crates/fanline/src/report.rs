use crate::{Error, Phase, Result, Totals, WorkerTallies};
use core::fmt;

/// Final metrics of one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// What the generator handed to the input queue.
    pub generated: Totals,
    /// What reached the end of the merged queue.
    pub collected: Totals,
    /// How many values each worker forwarded.
    pub tallies: WorkerTallies,
    /// How far the run had got when this report was taken.
    pub phase: Phase,
}

impl Report {
    /// Checks the conservation invariants of a fully drained run.
    ///
    /// Sums are compared first, then counts, then the per-worker
    /// distribution. The first violation is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::SumMismatch`] if the collected sum differs from the generated
    ///   sum.
    /// - [`Error::CountMismatch`] if the collected count differs from the
    ///   generated count.
    /// - [`Error::DistributionMismatch`] if the tallies do not add up to the
    ///   collected count.
    pub fn check(&self) -> Result<()> {
        if self.generated.sum != self.collected.sum {
            return Err(Error::SumMismatch {
                generated: self.generated.sum,
                collected: self.collected.sum,
            });
        }
        if self.generated.count != self.collected.count {
            return Err(Error::CountMismatch {
                generated: self.generated.count,
                collected: self.collected.count,
            });
        }
        let tallied = self.tallies.total();
        if tallied != self.collected.count {
            return Err(Error::DistributionMismatch {
                tallied,
                collected: self.collected.count,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "count:   generated {} collected {}",
            self.generated.count, self.collected.count
        )?;
        writeln!(
            f,
            "sum:     generated {} collected {}",
            self.generated.sum, self.collected.sum
        )?;
        write!(f, "workers: {:?}", self.tallies.as_slice())
    }
}

/// Outer collaborator that receives the outcome of a run.
///
/// [`Reporter::report`] is always called once the run has been validated,
/// even if validation failed, and sees the report at [`Phase::Validated`]. [`Reporter::fatal`] follows it when an
/// invariant was violated or a pipeline thread panicked.
pub trait Reporter {
    fn report(&self, report: &Report);

    fn fatal(&self, error: &Error);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, report: &Report) {
        (**self).report(report);
    }

    fn fatal(&self, error: &Error) {
        (**self).fatal(error);
    }
}
