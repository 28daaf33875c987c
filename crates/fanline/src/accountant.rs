//! Ground-truth counters for the values the generator produced.

use crate::Result;
use crate::mutex::{Mutex, lock};
use core::ops::AddAssign;
use std::sync::Arc;

/// A running `(count, sum)` pair over stream values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Totals {
    pub count: i64,
    pub sum: i64,
}

impl Totals {
    /// Creates totals from an explicit count and sum.
    pub const fn new(count: i64, sum: i64) -> Self {
        Self { count, sum }
    }

    /// Adds one value to the totals.
    pub const fn record(&mut self, value: i64) {
        self.count += 1;
        self.sum += value;
    }

    /// Sum of `1..=count`, i.e. what `sum` must be when the values seen were
    /// exactly the first `count` stream items.
    pub const fn gauss_sum(&self) -> i64 {
        self.count * (self.count + 1) / 2
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        self.sum += rhs.sum;
    }
}

impl FromIterator<i64> for Totals {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut totals = Self::default();
        for value in iter {
            totals.record(value);
        }
        totals
    }
}

/// Receives every value the generator managed to enqueue.
///
/// The generator calls [`ValueSink::on_value_produced`] exactly once per value
/// accepted by its output queue, and never for a value that was dropped
/// because the run ended first.
pub trait ValueSink: Send + Sync {
    fn on_value_produced(&self, value: i64);
}

impl<S: ValueSink + ?Sized> ValueSink for Arc<S> {
    fn on_value_produced(&self, value: i64) {
        (**self).on_value_produced(value);
    }
}

/// Thread-safe [`Totals`] for the generator side of the pipeline.
///
/// An `Accountant` is created before the pipeline starts and shared as an
/// [`Arc`]. Its totals are only meaningful once the generator thread has been
/// joined; [`Accountant::totals`] may be called earlier but then returns a
/// moving snapshot.
#[derive(Debug, Default)]
pub struct Accountant {
    totals: Mutex<Totals>,
}

impl Accountant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current totals.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockPoisoned`] if a producer panicked while
    /// recording a value.
    pub fn totals(&self) -> Result<Totals> {
        Ok(*lock(&self.totals)?)
    }
}

impl ValueSink for Accountant {
    fn on_value_produced(&self, value: i64) {
        // A poisoned lock is reported by `totals`, which every reader goes
        // through.
        if let Ok(mut totals) = lock(&self.totals) {
            totals.record(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn totals_record_count_and_sum() {
        let mut totals = Totals::default();
        totals.record(3);
        totals.record(4);
        assert_eq!(totals, Totals::new(2, 7));
    }

    #[test]
    fn gauss_sum_matches_contiguous_prefix() {
        let totals: Totals = (1..=100).collect();
        assert_eq!(totals.count, 100);
        assert_eq!(totals.sum, 5050);
        assert_eq!(totals.gauss_sum(), totals.sum);
        assert_eq!(Totals::default().gauss_sum(), 0);
    }

    #[test]
    fn totals_add_assign() {
        let mut totals = Totals::new(1, 1);
        totals += Totals::new(2, 5);
        assert_eq!(totals, Totals::new(3, 6));
    }

    #[test]
    fn accountant_is_consistent_across_threads() {
        const THREADS: i64 = 8;
        const PER_THREAD: i64 = 1000;

        let accountant = Arc::new(Accountant::new());

        thread::scope(|s| {
            for t in 0..THREADS {
                let accountant = Arc::clone(&accountant);
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        accountant.on_value_produced(t * PER_THREAD + i + 1);
                    }
                });
            }
        });

        let totals = accountant.totals().unwrap();
        let n = THREADS * PER_THREAD;
        assert_eq!(totals.count, n);
        assert_eq!(totals.sum, totals.gauss_sum());
    }

    #[test]
    fn arc_forwards_to_inner_sink() {
        let accountant = Arc::new(Accountant::new());
        let sink: Arc<dyn ValueSink> = accountant.clone();
        sink.on_value_produced(9);
        assert_eq!(accountant.totals().unwrap(), Totals::new(1, 9));
    }

    #[cfg(not(feature = "parking-lot"))]
    #[test]
    fn poisoned_accountant_reports_error() {
        use crate::Error;

        let accountant = Arc::new(Accountant::new());
        accountant.on_value_produced(1);

        let poisoner = Arc::clone(&accountant);
        let result = thread::spawn(move || {
            let _guard = poisoner.totals.lock().unwrap();
            panic!("panic while recording");
        })
        .join();
        assert!(result.is_err());

        accountant.on_value_produced(2);
        assert_eq!(accountant.totals(), Err(Error::LockPoisoned));
    }
}
