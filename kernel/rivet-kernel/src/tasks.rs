//! Mutual-exclusion demonstration tasks.
//!
//! Two tasks, `T1` and `T2`, take turns incrementing a shared counter
//! inside a critical section guarded by a [`SpinLock`]. On the target they
//! run back to back on the single hart; on the host they run as real
//! threads and actually contend for the lock.

use rivet_core::kprintln;
use rivet_core::sync::SpinLock;

/// The shared counter. Starts at zero and is only ever incremented.
pub type SharedCounter = SpinLock<u32>;

/// Names of the demonstration tasks, in scheduling order.
pub const TASKS: [&str; 2] = ["T1", "T2"];

/// Runs one critical section for task `name` and returns the counter value
/// it produced.
///
/// Prints `"<name>: Enter critical section"` and `"<name>: Counter = <n>"`
/// while holding the lock, then `"<name>: Exit critical section"` after
/// releasing it.
pub fn critical_section(name: &str, counter: &SharedCounter) -> u32 {
    let value = {
        let mut guard = counter.lock();
        kprintln!("{name}: Enter critical section");
        *guard += 1;
        let value = *guard;
        kprintln!("{name}: Counter = {value}");
        value
    };
    kprintln!("{name}: Exit critical section");
    value
}

/// Runs `rounds` rounds of `T1` then `T2` on the current hart.
pub fn run_interleaved(counter: &SharedCounter, rounds: usize) {
    for _ in 0..rounds {
        for name in TASKS {
            critical_section(name, counter);
        }
    }
}
