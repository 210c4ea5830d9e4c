//! Spin-based mutual exclusion lock over a [`LockWord`].

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};

use super::LockWord;

/// A spin-based mutual exclusion lock.
///
/// Acquisition goes through the reservation loop of [`LockWord`].
/// Const-constructable so it can be placed in `static` items.
///
/// Holding a `SpinLock` does not mask interrupts. Data that the timer
/// handler also touches belongs in an [`IrqSpinLock`](super::IrqSpinLock).
pub struct SpinLock<T> {
    word: LockWord,
    data: UnsafeCell<T>,
}

// SAFETY: The SpinLock ensures exclusive access to `T` via the lock word.
// `T: Send` is required because the data may be accessed from different contexts.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Creates a new unlocked `SpinLock` wrapping `value`.
    pub const fn new(value: T) -> Self {
        Self {
            word: LockWord::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires the lock, spinning until it becomes available.
    ///
    /// Returns a [`SpinLockGuard`] that releases the lock when dropped.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.word.lock();
        SpinLockGuard { lock: self }
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// Returns `Some(guard)` if the lock was acquired, `None` if it was already held.
    /// Used from the trap handler, which must never wait on foreground code.
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self.word.try_lock() {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Returns `true` if the lock is currently held.
    pub fn is_locked(&self) -> bool {
        self.word.is_locked()
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

/// RAII guard that releases the [`SpinLock`] when dropped.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: The guard guarantees exclusive access while it exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The guard guarantees exclusive access while it exists.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: The guard only exists while this context owns the word.
        unsafe { self.lock.word.unlock() };
    }
}
