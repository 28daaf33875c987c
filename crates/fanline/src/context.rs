//! Cancellable, time-bounded run context for the generator.
//!
//! A [`RunContext`] becomes *done* when its deadline passes or when its
//! [`Canceller`] fires, whichever happens first. Both conditions are exposed as
//! channels so the generator can wait on them in the same `select!` as its
//! send.

use crate::mutex::{Mutex, lock};
use crossbeam_channel::{Receiver, Sender, TryRecvError, at, bounded, never};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The done-signal consumed by the generator.
#[derive(Debug)]
pub struct RunContext {
    deadline: Receiver<Instant>,
    expires_at: Option<Instant>,
    cancelled: Receiver<()>,
}

/// Handle that ends a [`RunContext`] early.
///
/// Cloning shares the same signal. Cancelling is idempotent, and dropping the
/// last handle cancels the context as well, so a context never outlives every
/// handle that could stop it.
#[derive(Clone, Debug)]
pub struct Canceller {
    tx: Arc<Mutex<Option<Sender<()>>>>,
}

impl RunContext {
    /// Creates a context that expires `budget` from now.
    ///
    /// A budget too large to be represented as an [`Instant`] never expires.
    pub fn with_timeout(budget: Duration) -> (Self, Canceller) {
        match Instant::now().checked_add(budget) {
            Some(expires_at) => Self::with_deadline(expires_at),
            None => Self::without_deadline(),
        }
    }

    /// Creates a context that expires at `expires_at`.
    pub fn with_deadline(expires_at: Instant) -> (Self, Canceller) {
        Self::build(at(expires_at), Some(expires_at))
    }

    /// Creates a context that only ends through its [`Canceller`].
    pub fn without_deadline() -> (Self, Canceller) {
        Self::build(never(), None)
    }

    fn build(deadline: Receiver<Instant>, expires_at: Option<Instant>) -> (Self, Canceller) {
        // Nothing is ever sent on this channel; dropping the sender is the
        // signal.
        let (tx, cancelled) = bounded(0);
        let ctx = Self {
            deadline,
            expires_at,
            cancelled,
        };
        let canceller = Canceller {
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        (ctx, canceller)
    }

    /// Fires once when the deadline is reached.
    pub const fn deadline(&self) -> &Receiver<Instant> {
        &self.deadline
    }

    /// Becomes ready (disconnected) once the context is cancelled.
    pub const fn cancelled(&self) -> &Receiver<()> {
        &self.cancelled
    }

    /// Non-blocking check of both done conditions.
    pub fn is_done(&self) -> bool {
        let expired = self.expires_at.is_some_and(|t| Instant::now() >= t);
        expired || matches!(self.cancelled.try_recv(), Err(TryRecvError::Disconnected))
    }
}

impl Canceller {
    /// Cancels the context. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        // Nothing panics while holding this lock, so it cannot be poisoned.
        if let Ok(mut tx) = lock(&self.tx) {
            tx.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.tx).map_or(true, |tx| tx.is_none())
    }
}
