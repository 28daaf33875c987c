use crate::Result;
#[cfg(feature = "parking-lot")]
pub use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`. `parking_lot` mutexes never poison, so this always succeeds.
#[cfg(feature = "parking-lot")]
#[allow(clippy::unnecessary_wraps)]
pub fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    Ok(mutex.lock())
}

/// Locks `mutex`.
///
/// # Errors
///
/// Returns [`crate::Error::LockPoisoned`] if a thread panicked while holding
/// the lock.
#[cfg(not(feature = "parking-lot"))]
pub fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    Ok(mutex.lock()?)
}
