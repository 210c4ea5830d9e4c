//! Periodic machine timer.
//!
//! [`MachineTimer`] walks through three states, tracked in the type:
//!
//! ```text
//! Uninitialized --arm(interval)--> Armed --enable()--> Enabled
//!                                                        |  ^
//!                                                        +--+ handle_interrupt()
//! ```
//!
//! Only an [`Armed`] timer can be enabled, so the interrupt can never be
//! unmasked before a first deadline has been programmed:
//!
//! ```
//! use core::num::NonZeroU64;
//!
//! use rivet_driver_api::Platform;
//! use rivet_drivers::timer::MachineTimer;
//! use rivet_sim::SimMachine;
//!
//! let m = SimMachine::new(Platform::QEMU_VIRT);
//! let interval = NonZeroU64::new(1_000).unwrap();
//! let timer = MachineTimer::new(&m, &m, m.config()).arm(interval).enable();
//! assert_eq!(timer.deadline(), 1_000);
//! ```
//!
//! Skipping [`arm`](MachineTimer::arm) is a type error:
//!
//! ```compile_fail
//! use rivet_driver_api::Platform;
//! use rivet_drivers::timer::MachineTimer;
//! use rivet_sim::SimMachine;
//!
//! let m = SimMachine::new(Platform::QEMU_VIRT);
//! let timer = MachineTimer::new(&m, &m, m.config()).enable();
//! ```
//!
//! In the [`Enabled`] state
//! [`handle_interrupt`](MachineTimer::handle_interrupt) is the whole
//! trap-side contract: read the counter, push the compare register one
//! interval past that reading, then emit [`MARKER`].
//!
//! The next deadline is computed from the counter read at handler entry,
//! not from the previous deadline. Handler latency therefore stretches the
//! period instead of accumulating, and missed deadlines are skipped rather
//! than replayed.

use core::marker::PhantomData;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU32, Ordering};

use rivet_driver_api::{ConsoleSink, ControlRegisters, CsrBit, Platform, RegisterBus};

use crate::clint::Clint;

/// Diagnostic text written to the console on every timer interrupt.
pub const MARKER: &[u8] = b"MTIP\n";

mod sealed {
    pub trait Sealed {}
}

/// Marker trait for timer states.
pub trait TimerState: sealed::Sealed {}

/// No deadline programmed yet.
#[derive(Debug)]
pub enum Uninitialized {}
/// A first deadline is programmed; the interrupt is still masked.
#[derive(Debug)]
pub enum Armed {}
/// The interrupt is unmasked and the handler may run.
#[derive(Debug)]
pub enum Enabled {}

impl sealed::Sealed for Uninitialized {}
impl sealed::Sealed for Armed {}
impl sealed::Sealed for Enabled {}
impl TimerState for Uninitialized {}
impl TimerState for Armed {}
impl TimerState for Enabled {}

/// What one call to [`MachineTimer::handle_interrupt`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Counter value read at handler entry.
    pub entry: u64,
    /// Deadline written to the compare register.
    pub deadline: u64,
    /// Interrupts handled so far, including this one.
    pub count: u32,
}

/// The machine-mode timer interrupt source.
#[derive(Debug)]
pub struct MachineTimer<B, C, S: TimerState = Uninitialized> {
    clint: Clint<B>,
    csr: C,
    global_enable: CsrBit,
    timer_enable: CsrBit,
    interval: u64,
    ticks: AtomicU32,
    _state: PhantomData<S>,
}

impl<B: RegisterBus, C: ControlRegisters> MachineTimer<B, C, Uninitialized> {
    /// Creates a timer. Does **not** touch hardware.
    #[must_use]
    pub fn new(bus: B, csr: C, platform: &Platform) -> Self {
        Self {
            clint: Clint::new(bus, platform),
            csr,
            global_enable: platform.global_enable,
            timer_enable: platform.timer_enable,
            interval: 0,
            ticks: AtomicU32::new(0),
            _state: PhantomData,
        }
    }

    /// Programs the first deadline, `interval` ticks from now.
    ///
    /// A deadline past the end of the counter saturates to `u64::MAX`
    /// instead of wrapping into the past. Once the counter itself reaches
    /// `u64::MAX` no later deadline exists and the interrupt stays pending.
    /// That is about 58,000 years after reset at QEMU's 10 MHz, so it is
    /// accepted as a limit rather than handled.
    #[must_use]
    pub fn arm(self, interval: NonZeroU64) -> MachineTimer<B, C, Armed> {
        let interval = interval.get();
        let deadline = self.clint.now().saturating_add(interval);
        self.clint.set_compare(deadline);
        let mut armed: MachineTimer<B, C, Armed> = self.into_state();
        armed.interval = interval;
        armed
    }
}

impl<B: RegisterBus, C: ControlRegisters> MachineTimer<B, C, Armed> {
    /// Returns the programmed deadline.
    pub fn deadline(&self) -> u64 {
        self.clint.compare()
    }

    /// Unmasks the timer interrupt: first the per-source enable, then the
    /// global enable.
    ///
    /// The handler may run before this returns, so the caller must already
    /// have a path from the trap to a timer that can handle it. Use
    /// [`enable_with`](Self::enable_with) when the handler needs this very
    /// timer.
    #[must_use]
    pub fn enable(self) -> MachineTimer<B, C, Enabled> {
        self.csr.set_bits(self.timer_enable.csr, self.timer_enable.mask());
        self.csr.set_bits(self.global_enable.csr, self.global_enable.mask());
        self.into_state()
    }

    /// Unmasks the timer interrupt, handing the enabled timer to `install`
    /// between the per-source and the global enable.
    ///
    /// `install` typically stores the timer where the trap handler finds it.
    /// No timer trap can be taken while it runs.
    pub fn enable_with(self, install: impl FnOnce(MachineTimer<B, C, Enabled>))
    where
        C: Clone,
    {
        let csr = self.csr.clone();
        let global = self.global_enable;
        self.csr.set_bits(self.timer_enable.csr, self.timer_enable.mask());
        install(self.into_state());
        csr.set_bits(global.csr, global.mask());
    }
}

impl<B: RegisterBus, C: ControlRegisters> MachineTimer<B, C, Enabled> {
    /// Services one timer interrupt.
    ///
    /// Reads the counter, programs the next deadline one interval past it
    /// and only then writes [`MARKER`] to `sink`. Must be called from the
    /// machine-timer trap with interrupts masked; returning without this
    /// call leaves the interrupt pending and the hart re-enters the trap
    /// forever.
    ///
    /// The deadline saturates the same way as in
    /// [`arm`](MachineTimer::arm).
    pub fn handle_interrupt<S: ConsoleSink + ?Sized>(&self, sink: &S) -> Tick {
        let entry = self.clint.now();
        let deadline = entry.saturating_add(self.interval);
        self.clint.set_compare(deadline);
        let count = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        sink.write_bytes(MARKER);
        Tick {
            entry,
            deadline,
            count,
        }
    }

    /// Returns the next deadline.
    pub fn deadline(&self) -> u64 {
        self.clint.compare()
    }
}

impl<B: RegisterBus, C: ControlRegisters, S: TimerState> MachineTimer<B, C, S> {
    /// Returns the period in counter ticks (0 before [`arm`](MachineTimer::arm)).
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Returns the number of interrupts handled so far.
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Returns the counter/compare accessor.
    pub fn clint(&self) -> &Clint<B> {
        &self.clint
    }

    fn into_state<T: TimerState>(self) -> MachineTimer<B, C, T> {
        MachineTimer {
            clint: self.clint,
            csr: self.csr,
            global_enable: self.global_enable,
            timer_enable: self.timer_enable,
            interval: self.interval,
            ticks: self.ticks,
            _state: PhantomData,
        }
    }
}
