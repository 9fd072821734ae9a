//! Mutex used by the in-memory stores.
//!
//! `parking_lot::Mutex` with the `fast-lock` feature, `std::sync::Mutex`
//! otherwise. Use [`lock`] so both behave the same.

/// Store mutex (`parking_lot`).
#[cfg(feature = "fast-lock")]
pub type Mutex<T> = parking_lot::Mutex<T>;

/// Store mutex (`std`).
#[cfg(not(feature = "fast-lock"))]
pub type Mutex<T> = std::sync::Mutex<T>;

/// Lock a mutex, recovering the guard if a writer panicked.
///
/// A poisoned store still holds every result saved before the panic, so the
/// data is returned rather than dropped.
///
/// ```rust
/// use kbeval::sync::{lock, Mutex};
///
/// let results = Mutex::new(Vec::<u64>::new());
/// lock(&results).push(7);
/// assert_eq!(lock(&results).len(), 1);
/// ```
#[cfg(feature = "fast-lock")]
pub fn lock<T>(mutex: &Mutex<T>) -> parking_lot::MutexGuard<'_, T> {
    mutex.lock()
}

/// Lock a mutex, recovering the guard if a writer panicked.
///
/// A poisoned store still holds every result saved before the panic, so the
/// data is returned rather than dropped.
///
/// ```rust
/// use kbeval::sync::{lock, Mutex};
///
/// let results = Mutex::new(Vec::<u64>::new());
/// lock(&results).push(7);
/// assert_eq!(lock(&results).len(), 1);
/// ```
#[cfg(not(feature = "fast-lock"))]
pub fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
