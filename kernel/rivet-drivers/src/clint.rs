//! CLINT machine timer registers (`mtime` / `mtimecmp`).

use rivet_driver_api::{Platform, RegisterBus};

/// Accessor for one hart's timer counter and compare register.
#[derive(Debug, Clone, Copy)]
pub struct Clint<B> {
    bus: B,
    counter: usize,
    compare: usize,
}

impl<B: RegisterBus> Clint<B> {
    /// Creates an accessor. Does **not** touch hardware.
    #[must_use]
    pub const fn new(bus: B, platform: &Platform) -> Self {
        let config = platform.config();
        Self {
            bus,
            counter: config.counter_addr,
            compare: config.compare_addr,
        }
    }

    /// Reads the free-running counter.
    #[inline]
    pub fn now(&self) -> u64 {
        self.bus.read_u64(self.counter)
    }

    /// Reads the compare register.
    #[inline]
    pub fn compare(&self) -> u64 {
        self.bus.read_u64(self.compare)
    }

    /// Writes the compare register. The timer interrupt is pending while
    /// `now() >= compare()`.
    #[inline]
    pub fn set_compare(&self, deadline: u64) {
        self.bus.write_u64(self.compare, deadline);
    }

    /// Busy-waits until `ticks` counter ticks have elapsed.
    pub fn delay(&self, ticks: u64) {
        let start = self.now();
        while self.now().wrapping_sub(start) < ticks {
            core::hint::spin_loop();
        }
    }
}
