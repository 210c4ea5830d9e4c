//! Reservation-based lock word.
//!
//! A single 32-bit word that is either [`UNLOCKED`] (0) or [`LOCKED`] (1).
//! Acquisition follows the load-reserved / store-conditional pattern:
//! reserve the word and read it, retry while it is non-zero, then attempt a
//! conditional store of 1 against the same reservation and retry if the
//! reservation was lost.
//!
//! The conditional store is expressed as `compare_exchange_weak`, whose
//! spurious failure is exactly a lost reservation. On targets with the `A`
//! extension this lowers to an `lr.w`/`sc.w` pair.
//!
//! There is no fairness and no retry bound: a contending context may spin
//! forever under pathological contention.

use super::loom_compat::{AtomicU32, Ordering, spin_hint};

/// Value of a lock word that nobody holds.
pub const UNLOCKED: u32 = 0;
/// Value of a lock word that some context holds.
pub const LOCKED: u32 = 1;

/// A raw mutual-exclusion word with no data attached.
///
/// The word carries no notion of an owner. Whoever moves it from
/// [`UNLOCKED`] to [`LOCKED`] owns the critical section until it stores
/// [`UNLOCKED`] again.
pub struct LockWord {
    word: AtomicU32,
}

impl LockWord {
    /// Creates an unlocked word.
    #[cfg(not(any(loom, shuttle)))]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(UNLOCKED),
        }
    }

    /// Creates an unlocked word.
    #[cfg(any(loom, shuttle))]
    #[must_use]
    pub fn new() -> Self {
        Self {
            word: AtomicU32::new(UNLOCKED),
        }
    }

    /// Spins until this context owns the word.
    ///
    /// Returns the number of failed attempts before the successful
    /// conditional store. Callers that only need the lock can ignore it.
    pub fn lock(&self) -> u32 {
        let mut retries: u32 = 0;
        loop {
            // Reserve and read. A held word sends us back to the top without
            // touching the store path.
            if self.word.load(Ordering::Relaxed) != UNLOCKED {
                retries = retries.wrapping_add(1);
                spin_hint();
                continue;
            }

            // Conditional store of LOCKED against the reservation. Failure
            // means another context touched the word in between.
            if self
                .word
                .compare_exchange_weak(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return retries;
            }
            retries = retries.wrapping_add(1);
            spin_hint();
        }
    }

    /// Makes a single acquisition attempt.
    ///
    /// Returns `true` if this context now owns the word.
    pub fn try_lock(&self) -> bool {
        self.word
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Releases the word with a plain store.
    ///
    /// # Safety
    ///
    /// The caller must currently own the word (its own [`lock`](Self::lock)
    /// or successful [`try_lock`](Self::try_lock) has not yet been paired
    /// with an unlock). Releasing a word held by another context breaks
    /// mutual exclusion and is not detected.
    pub unsafe fn unlock(&self) {
        self.word.store(UNLOCKED, Ordering::Release);
    }

    /// Returns `true` if some context holds the word.
    ///
    /// The answer may be stale by the time the caller looks at it.
    pub fn is_locked(&self) -> bool {
        self.word.load(Ordering::Relaxed) != UNLOCKED
    }
}

#[cfg(not(any(loom, shuttle)))]
impl Default for LockWord {
    fn default() -> Self {
        Self::new()
    }
}
