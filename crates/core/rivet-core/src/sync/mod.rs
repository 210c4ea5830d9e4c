//! Synchronization primitives for the runtime.
//!
//! Everything is built on [`LockWord`], the reservation-based lock word.
//! [`SpinLock`] and [`IrqSpinLock`] wrap it with RAII guards and are
//! const-constructable for use in `static` items.
//!
//! Under `cfg(loom)` or `cfg(shuttle)` only the lock word is compiled,
//! because the model checkers' atomics cannot be built in a `const fn`.

mod lock_word;
pub(crate) mod loom_compat;

#[cfg(not(any(loom, shuttle)))]
mod irq_spinlock;
#[cfg(not(any(loom, shuttle)))]
mod spinlock;

pub use lock_word::{LOCKED, LockWord, UNLOCKED};

#[cfg(not(any(loom, shuttle)))]
pub use irq_spinlock::{IrqSpinLock, IrqSpinLockGuard};
#[cfg(not(any(loom, shuttle)))]
pub use spinlock::{SpinLock, SpinLockGuard};
