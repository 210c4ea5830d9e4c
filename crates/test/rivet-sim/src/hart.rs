//! Simulated hart: time advance and machine-timer trap delivery.

use crate::machine::SimMachine;

/// Consecutive trap deliveries at one counter value before a handler is
/// declared stuck.
pub const DEFAULT_LIVELOCK_LIMIT: u32 = 64;

/// Drives a [`SimMachine`] forward in time and delivers timer traps.
///
/// Trap delivery mirrors the hardware: the global enable is cleared for the
/// duration of the handler and restored on return. A handler that returns
/// without pushing the compare register past the counter leaves the
/// interrupt pending and is re-entered immediately; after [`DEFAULT_LIVELOCK_LIMIT`] such re-entries the hart
/// panics with a livelock report.
#[derive(Debug)]
pub struct SimHart<'m> {
    machine: &'m SimMachine,
    livelock_limit: u32,
}

impl<'m> SimHart<'m> {
    /// Creates a hart executing on `machine`.
    pub fn new(machine: &'m SimMachine) -> Self {
        Self {
            machine,
            livelock_limit: DEFAULT_LIVELOCK_LIMIT,
        }
    }

    /// Overrides the livelock threshold.
    #[must_use]
    pub fn with_livelock_limit(mut self, limit: u32) -> Self {
        self.livelock_limit = limit.max(1);
        self
    }

    /// Returns the machine this hart runs on.
    pub fn machine(&self) -> &'m SimMachine {
        self.machine
    }

    /// Delivers the timer trap to `handler` for as long as the hart would
    /// take it at the current counter value. Returns the number of traps
    /// delivered.
    ///
    /// # Panics
    ///
    /// Panics if the trap is still deliverable after the livelock limit.
    pub fn deliver_pending(&self, mut handler: impl FnMut()) -> u32 {
        let mut delivered = 0;
        while self.machine.timer_deliverable() {
            if delivered == self.livelock_limit {
                panic!(
                    "timer interrupt livelock: {delivered} traps at counter {} without \
                     the handler moving compare ({}) past it",
                    self.machine.counter(),
                    self.machine.compare(),
                );
            }
            self.trap(&mut handler);
            delivered += 1;
        }
        delivered
    }

    /// Runs the counter forward to `target`, stopping at every deadline the
    /// hart would trap on and delivering it. Returns the number of traps
    /// delivered.
    ///
    /// The counter only ever moves forward; a `target` at or below the
    /// current value still delivers anything already pending.
    ///
    /// # Panics
    ///
    /// Panics on handler livelock, see [`deliver_pending`](Self::deliver_pending).
    pub fn advance_to(&self, target: u64, mut handler: impl FnMut()) -> u32 {
        let mut delivered = self.deliver_pending(&mut handler);
        loop {
            let now = self.machine.counter();
            if now >= target {
                break;
            }
            let compare = self.machine.compare();
            let next = if self.timer_armed() && compare > now && compare < target {
                compare
            } else {
                target
            };
            self.machine.set_counter(next);
            delivered += self.deliver_pending(&mut handler);
        }
        delivered
    }

    /// Like [`advance_to`](Self::advance_to), relative to the current
    /// counter.
    pub fn advance_by(&self, delta: u64, handler: impl FnMut()) -> u32 {
        let target = self.machine.counter().saturating_add(delta);
        self.advance_to(target, handler)
    }

    fn timer_armed(&self) -> bool {
        let cfg = self.machine.config();
        self.machine.csr_value(cfg.global_enable.csr) & cfg.global_enable.mask() != 0
            && self.machine.csr_value(cfg.timer_enable.csr) & cfg.timer_enable.mask() != 0
    }

    fn trap(&self, handler: &mut impl FnMut()) {
        let global = self.machine.config().global_enable;
        let saved = self.machine.csr_value(global.csr);
        self.machine.set_csr_value(global.csr, saved & !global.mask());

        handler();

        // mret: MIE <- MPIE
        let current = self.machine.csr_value(global.csr);
        let restored = (current & !global.mask()) | (saved & global.mask());
        self.machine.set_csr_value(global.csr, restored);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rivet_driver_api::{ControlRegisters, Csr, Platform, RegisterBus};

    use super::*;

    fn enabled_machine(compare: u64) -> SimMachine {
        let m = SimMachine::new(Platform::QEMU_VIRT);
        let cfg = *m.config();
        m.write_u64(cfg.compare_addr, compare);
        m.set_bits(cfg.timer_enable.csr, cfg.timer_enable.mask());
        m.set_bits(cfg.global_enable.csr, cfg.global_enable.mask());
        m
    }

    #[test]
    fn no_delivery_while_disabled() {
        let m = SimMachine::new(Platform::QEMU_VIRT);
        m.write_u64(m.config().compare_addr, 10);
        let hart = SimHart::new(&m);
        assert_eq!(hart.advance_to(100, || panic!("trap while disabled")), 0);
        assert_eq!(m.counter(), 100);
    }

    #[test]
    fn stops_at_each_deadline() {
        let m = enabled_machine(10);
        let hart = SimHart::new(&m);
        let seen = Cell::new(Vec::new());
        let fired = hart.advance_to(35, || {
            let now = m.counter();
            let mut v = seen.take();
            v.push(now);
            seen.set(v);
            m.write_u64(m.config().compare_addr, now + 10);
        });
        assert_eq!(fired, 3);
        assert_eq!(seen.take(), [10, 20, 30]);
        assert_eq!(m.counter(), 35);
        assert_eq!(m.compare(), 40);
    }

    #[test]
    fn handler_runs_with_interrupts_masked() {
        let m = enabled_machine(5);
        let hart = SimHart::new(&m);
        let mask = m.config().global_enable.mask();
        hart.advance_to(5, || {
            assert_eq!(m.csr_value(Csr::Mstatus) & mask, 0);
            m.write_u64(m.config().compare_addr, u64::MAX);
        });
        assert_eq!(m.csr_value(Csr::Mstatus) & mask, mask);
    }

    #[test]
    #[should_panic(expected = "timer interrupt livelock")]
    fn handler_that_never_reprograms_livelocks() {
        let m = enabled_machine(1);
        let hart = SimHart::new(&m).with_livelock_limit(8);
        hart.advance_to(1, || {});
    }
}
