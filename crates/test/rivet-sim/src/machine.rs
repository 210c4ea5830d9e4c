//! Simulated register file: UART, CLINT and machine CSRs.

use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use rivet_driver_api::{ControlRegisters, Csr, Mie, Platform, RegisterBus};

/// How the simulated UART status register reports transmitter readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Ready on every poll.
    Always,
    /// Not ready for the next `n` polls, then ready from then on.
    After(u64),
    /// Never ready. Models a dead device.
    Never,
}

/// A side-effecting access recorded by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A byte was written to the transmit register.
    Transmit(u8),
    /// The timer counter was read and returned this value.
    CounterRead(u64),
    /// The timer compare register was written.
    CompareWrite(u64),
    /// Bits were set in a CSR.
    CsrSet(Csr, usize),
    /// Bits were cleared in a CSR.
    CsrClear(Csr, usize),
}

#[derive(Debug)]
struct State {
    tx: Vec<u8>,
    counter: u64,
    compare: u64,
    readiness: Readiness,
    status_polls: u64,
    journal: Vec<Event>,
    echo: bool,
}

/// An in-memory machine laid out according to a [`Platform`].
///
/// Accesses to addresses the configuration does not name panic, which
/// turns a driver reaching for a hard-coded register into a test failure.
#[derive(Debug)]
pub struct SimMachine {
    config: Platform,
    state: Mutex<State>,
    csrs: [AtomicUsize; 3],
}

impl SimMachine {
    /// Creates a machine at reset: counter 0, compare at `u64::MAX`, all
    /// CSR bits clear, transmitter always ready.
    pub fn new(config: Platform) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                tx: Vec::new(),
                counter: 0,
                compare: u64::MAX,
                readiness: Readiness::Always,
                status_polls: 0,
                journal: Vec::new(),
                echo: false,
            }),
            csrs: [AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)],
        }
    }

    /// Also copies every transmitted byte to the host's stdout.
    #[must_use]
    pub fn with_echo(self) -> Self {
        self.state().echo = true;
        self
    }

    /// Returns the configuration this machine was laid out with.
    pub fn config(&self) -> &Platform {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the journal from the others.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn csr_slot(&self, csr: Csr) -> &AtomicUsize {
        match csr {
            Csr::Mstatus => &self.csrs[0],
            Csr::Mie => &self.csrs[1],
            Csr::Mip => &self.csrs[2],
        }
    }

    // ── UART ──────────────────────────────────────────────────────────

    /// Sets how the status register reports readiness from now on.
    pub fn set_readiness(&self, readiness: Readiness) {
        self.state().readiness = readiness;
    }

    /// Returns the number of status register reads so far.
    pub fn status_polls(&self) -> u64 {
        self.state().status_polls
    }

    /// Returns a copy of every byte transmitted so far.
    pub fn transmitted(&self) -> Vec<u8> {
        self.state().tx.clone()
    }

    /// Returns the transmitted bytes as text, replacing invalid UTF-8.
    pub fn transmitted_string(&self) -> String {
        String::from_utf8_lossy(&self.state().tx).into_owned()
    }

    /// Removes and returns every byte transmitted so far.
    pub fn take_transmitted(&self) -> Vec<u8> {
        std::mem::take(&mut self.state().tx)
    }

    // ── CLINT ─────────────────────────────────────────────────────────

    /// Returns the timer counter without journaling a read.
    pub fn counter(&self) -> u64 {
        self.state().counter
    }

    /// Sets the timer counter.
    pub fn set_counter(&self, value: u64) {
        self.state().counter = value;
    }

    /// Moves the timer counter forward, saturating at `u64::MAX`.
    pub fn advance_counter(&self, delta: u64) {
        let mut state = self.state();
        state.counter = state.counter.saturating_add(delta);
    }

    /// Returns the timer compare register.
    pub fn compare(&self) -> u64 {
        self.state().compare
    }

    /// Returns `true` if the timer comparator is asserting its interrupt
    /// line (`mip.MTIP`), regardless of enables.
    pub fn timer_pending(&self) -> bool {
        let state = self.state();
        state.counter >= state.compare
    }

    /// Returns `true` if the hart would take a timer trap right now.
    pub fn timer_deliverable(&self) -> bool {
        let global = self.config.global_enable;
        let local = self.config.timer_enable;
        self.timer_pending()
            && self.csr_slot(global.csr).load(Ordering::Acquire) & global.mask() != 0
            && self.csr_slot(local.csr).load(Ordering::Acquire) & local.mask() != 0
    }

    // ── CSRs ──────────────────────────────────────────────────────────

    /// Returns a CSR's raw contents without journaling.
    pub fn csr_value(&self, csr: Csr) -> usize {
        self.csr_slot(csr).load(Ordering::Acquire)
    }

    /// Writes a CSR's raw contents without journaling, as trap entry and
    /// `mret` do in hardware.
    pub(crate) fn set_csr_value(&self, csr: Csr, value: usize) {
        self.csr_slot(csr).store(value, Ordering::Release);
    }

    // ── Journal ───────────────────────────────────────────────────────

    /// Returns a copy of the access journal.
    pub fn journal(&self) -> Vec<Event> {
        self.state().journal.clone()
    }

    /// Clears the access journal.
    pub fn clear_journal(&self) {
        self.state().journal.clear();
    }
}

impl RegisterBus for SimMachine {
    fn read_u8(&self, addr: usize) -> u8 {
        assert_eq!(addr, self.config.ready_addr, "unmapped byte read at {addr:#x}");
        let mut state = self.state();
        state.status_polls += 1;
        let readiness = state.readiness;
        let ready = match readiness {
            Readiness::Always => true,
            Readiness::Never => false,
            Readiness::After(0) => {
                state.readiness = Readiness::Always;
                true
            }
            Readiness::After(n) => {
                state.readiness = Readiness::After(n - 1);
                false
            }
        };
        if ready { 1 << self.config.ready_bit } else { 0 }
    }

    fn write_u8(&self, addr: usize, value: u8) {
        assert_eq!(addr, self.config.tx_addr, "unmapped byte write at {addr:#x}");
        let mut state = self.state();
        state.tx.push(value);
        state.journal.push(Event::Transmit(value));
        if state.echo {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(&[value]);
            let _ = out.flush();
        }
    }

    fn read_u64(&self, addr: usize) -> u64 {
        let mut state = self.state();
        if addr == self.config.counter_addr {
            let value = state.counter;
            state.journal.push(Event::CounterRead(value));
            value
        } else if addr == self.config.compare_addr {
            state.compare
        } else {
            panic!("unmapped doubleword read at {addr:#x}");
        }
    }

    fn write_u64(&self, addr: usize, value: u64) {
        let mut state = self.state();
        if addr == self.config.compare_addr {
            state.compare = value;
            state.journal.push(Event::CompareWrite(value));
        } else if addr == self.config.counter_addr {
            state.counter = value;
        } else {
            panic!("unmapped doubleword write at {addr:#x}");
        }
    }
}

impl ControlRegisters for SimMachine {
    fn read(&self, csr: Csr) -> usize {
        if csr == Csr::Mip {
            // MTIP is wired to the comparator, not software-writable.
            let mtip = if self.timer_pending() { Mie::MTIE.bits() } else { 0 };
            return (self.csr_value(Csr::Mip) & !Mie::MTIE.bits()) | mtip;
        }
        self.csr_value(csr)
    }

    fn set_bits(&self, csr: Csr, mask: usize) {
        self.csr_slot(csr).fetch_or(mask, Ordering::AcqRel);
        self.state().journal.push(Event::CsrSet(csr, mask));
    }

    fn clear_bits(&self, csr: Csr, mask: usize) {
        self.csr_slot(csr).fetch_and(!mask, Ordering::AcqRel);
        self.state().journal.push(Event::CsrClear(csr, mask));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> SimMachine {
        SimMachine::new(Platform::QEMU_VIRT)
    }

    #[test]
    fn reset_state() {
        let m = machine();
        assert_eq!(m.counter(), 0);
        assert_eq!(m.compare(), u64::MAX);
        assert!(!m.timer_pending());
        assert_eq!(m.csr_value(Csr::Mstatus), 0);
        assert!(m.transmitted().is_empty());
    }

    #[test]
    fn ready_after_counts_down() {
        let m = machine();
        m.set_readiness(Readiness::After(2));
        let addr = m.config().ready_addr;
        assert_eq!(m.read_u8(addr), 0);
        assert_eq!(m.read_u8(addr), 0);
        assert_eq!(m.read_u8(addr), 1 << 5);
        assert_eq!(m.read_u8(addr), 1 << 5);
        assert_eq!(m.status_polls(), 4);
    }

    #[test]
    fn never_ready_stays_low() {
        let m = machine();
        m.set_readiness(Readiness::Never);
        for _ in 0..100 {
            assert_eq!(m.read_u8(m.config().ready_addr), 0);
        }
    }

    #[test]
    fn transmit_is_recorded() {
        let m = machine();
        m.write_u8(m.config().tx_addr, b'A');
        assert_eq!(m.transmitted(), b"A");
        assert_eq!(m.journal(), [Event::Transmit(b'A')]);
        assert_eq!(m.take_transmitted(), b"A");
        assert!(m.transmitted().is_empty());
    }

    #[test]
    #[should_panic(expected = "unmapped byte write")]
    fn unmapped_write_panics() {
        let m = machine();
        m.write_u8(0x1000_0001, 0);
    }

    #[test]
    fn comparator_drives_mtip() {
        let m = machine();
        m.write_u64(m.config().compare_addr, 10);
        m.set_counter(9);
        assert_eq!(m.read(Csr::Mip) & Mie::MTIE.bits(), 0);
        m.advance_counter(1);
        assert_eq!(m.read(Csr::Mip) & Mie::MTIE.bits(), Mie::MTIE.bits());
        assert!(!m.timer_deliverable());
    }

    #[test]
    fn deliverable_needs_both_enables() {
        let m = machine();
        let cfg = *m.config();
        m.write_u64(cfg.compare_addr, 0);
        m.set_bits(cfg.timer_enable.csr, cfg.timer_enable.mask());
        assert!(!m.timer_deliverable());
        m.set_bits(cfg.global_enable.csr, cfg.global_enable.mask());
        assert!(m.timer_deliverable());
        m.clear_bits(cfg.global_enable.csr, cfg.global_enable.mask());
        assert!(!m.timer_deliverable());
    }

    #[test]
    fn counter_reads_are_journaled() {
        let m = machine();
        m.set_counter(42);
        assert_eq!(m.read_u64(m.config().counter_addr), 42);
        assert_eq!(m.journal(), [Event::CounterRead(42)]);
    }
}
