//! Machine-mode interrupt masking.
//!
//! On bare-metal RISC-V these helpers toggle `mstatus.MIE`. The hart clears
//! that bit itself on trap entry and restores it on `mret`, so code running
//! inside the trap handler already sees interrupts masked.
//!
//! Host builds have no interrupts to mask; the helpers report "disabled" and
//! do nothing, which keeps the lock types usable in host tests.

/// Global interrupt enable state captured by [`save_and_disable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct InterruptState {
    enabled: bool,
}

impl InterruptState {
    /// Returns `true` if interrupts were enabled when the state was captured.
    pub const fn was_enabled(self) -> bool {
        self.enabled
    }
}

/// Masks machine interrupts and returns the previous state.
#[inline]
pub fn save_and_disable() -> InterruptState {
    let enabled = are_enabled();
    if enabled {
        disable();
    }
    InterruptState { enabled }
}

/// Restores a state captured by [`save_and_disable`].
///
/// Only re-enables. A state captured while interrupts were masked leaves
/// the current setting alone, so a nested critical section cannot unmask
/// early.
#[inline]
pub fn restore(state: InterruptState) {
    if state.enabled {
        enable();
    }
}

#[cfg(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64")))]
mod imp {
    /// Reads `mstatus.MIE`.
    #[inline]
    pub fn are_enabled() -> bool {
        riscv::register::mstatus::read().mie()
    }

    /// Clears `mstatus.MIE`.
    #[inline]
    pub fn disable() {
        // SAFETY: Masking interrupts in machine mode cannot break memory safety.
        unsafe { riscv::register::mstatus::clear_mie() };
    }

    /// Sets `mstatus.MIE`.
    #[inline]
    pub fn enable() {
        // SAFETY: The trap vector is installed by the runtime before `main`.
        unsafe { riscv::register::mstatus::set_mie() };
    }
}

#[cfg(not(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64"))))]
mod imp {
    /// Always `false`: the host never delivers machine interrupts.
    #[inline]
    pub fn are_enabled() -> bool {
        false
    }

    /// No-op on the host.
    #[inline]
    pub fn disable() {}

    /// No-op on the host.
    #[inline]
    pub fn enable() {}
}

pub use imp::{are_enabled, disable, enable};
