//! Driver API types and traits for the Rivet runtime.
//!
//! Drivers never hard-code where their registers live. They receive a
//! [`Platform`], a validated [`PlatformConfig`] naming every address and
//! bit they touch, plus a
//! [`RegisterBus`] and [`ControlRegisters`] handle through which all
//! accesses go. Real hardware plugs in volatile MMIO and CSR instructions;
//! tests plug in a simulated register file.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod console;
pub mod csr;
pub mod error;
pub mod hw;
pub mod platform;

pub use console::ConsoleSink;
pub use csr::{Csr, CsrBit, Mie, Mstatus};
pub use error::DriverError;
pub use hw::{ControlRegisters, RegisterBus};
pub use platform::{Platform, PlatformConfig};
