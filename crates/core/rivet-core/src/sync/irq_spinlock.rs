//! Interrupt-safe spin lock.
//!
//! Masks machine interrupts before acquiring the inner lock word and
//! restores the previous interrupt state on release. A foreground context
//! holding the lock can then never be preempted by the timer handler, so
//! the handler can never spin on a word the foreground holds.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use super::LockWord;
use crate::interrupts::{self, InterruptState};

/// A spin lock that masks interrupts while held.
pub struct IrqSpinLock<T> {
    word: LockWord,
    data: UnsafeCell<T>,
}

// SAFETY: as for SpinLock, the lock word ensures exclusive access.
unsafe impl<T: Send> Send for IrqSpinLock<T> {}
unsafe impl<T: Send> Sync for IrqSpinLock<T> {}

impl<T> IrqSpinLock<T> {
    /// Creates a new unlocked `IrqSpinLock`.
    pub const fn new(value: T) -> Self {
        Self {
            word: LockWord::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires the lock, masking interrupts first.
    pub fn lock(&self) -> IrqSpinLockGuard<'_, T> {
        let saved = interrupts::save_and_disable();
        self.word.lock();
        IrqSpinLockGuard {
            lock: self,
            saved,
            _not_send: PhantomData,
        }
    }

    /// Attempts to acquire the lock without blocking.
    pub fn try_lock(&self) -> Option<IrqSpinLockGuard<'_, T>> {
        let saved = interrupts::save_and_disable();
        if self.word.try_lock() {
            Some(IrqSpinLockGuard {
                lock: self,
                saved,
                _not_send: PhantomData,
            })
        } else {
            // Failed: restore interrupt state.
            interrupts::restore(saved);
            None
        }
    }
}

/// RAII guard that restores interrupt state on drop.
///
/// Not `Send`: the saved state belongs to the hart that took the lock.
pub struct IrqSpinLockGuard<'a, T> {
    lock: &'a IrqSpinLock<T>,
    saved: InterruptState,
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for IrqSpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: The lock is held, so we have exclusive access to the data.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for IrqSpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The lock is held, so we have exclusive access to the data.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for IrqSpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: The guard only exists while this context owns the word.
        unsafe { self.lock.word.unlock() };
        interrupts::restore(self.saved);
    }
}
