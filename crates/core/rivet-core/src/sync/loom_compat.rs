//! Model-checker compatibility shim.
//!
//! When compiled with `cfg(loom)` or `cfg(shuttle)`, re-exports that
//! checker's atomics and yield point. Otherwise, re-exports the standard
//! `core::sync::atomic` types and the CPU spin hint.
//!
//! This allows the lock word to be tested under a controlled scheduler
//! without code changes.

// ---------------------------------------------------------------------------
// Loom mode
// ---------------------------------------------------------------------------

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicU32, Ordering};

/// Gives the model scheduler a chance to run another thread.
#[cfg(loom)]
#[inline]
pub(crate) fn spin_hint() {
    loom::thread::yield_now();
}

// ---------------------------------------------------------------------------
// Shuttle mode
// ---------------------------------------------------------------------------

#[cfg(all(shuttle, not(loom)))]
pub(crate) use shuttle::sync::atomic::{AtomicU32, Ordering};

/// Gives the randomized scheduler a chance to run another task.
#[cfg(all(shuttle, not(loom)))]
#[inline]
pub(crate) fn spin_hint() {
    shuttle::thread::yield_now();
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

#[cfg(not(any(loom, shuttle)))]
pub(crate) use core::sync::atomic::{AtomicU32, Ordering};

/// Tells the hart it is in a busy-wait loop.
#[cfg(not(any(loom, shuttle)))]
#[inline]
pub(crate) fn spin_hint() {
    core::hint::spin_loop();
}
