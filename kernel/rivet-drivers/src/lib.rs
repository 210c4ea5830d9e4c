//! Hardware drivers for the Rivet runtime.
//!
//! Every driver is generic over the [`RegisterBus`] and [`ControlRegisters`]
//! it talks through. On the target that is [`Mmio`] and [`MachineCsr`]; in
//! tests it is a simulated machine.
//!
//! [`RegisterBus`]: rivet_driver_api::RegisterBus
//! [`ControlRegisters`]: rivet_driver_api::ControlRegisters

#![cfg_attr(not(test), no_std)]

// ── Bus implementations ─────────────────────────────────────────────────

#[cfg(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64")))]
pub mod csr;
pub mod mmio;

// ── Devices ─────────────────────────────────────────────────────────────

pub mod clint;
pub mod timer;
pub mod uart;

#[cfg(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64")))]
pub use csr::MachineCsr;
pub use mmio::Mmio;
