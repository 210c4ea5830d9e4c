//! Simulated RISC-V machine for host-side tests.
//!
//! [`SimMachine`] implements the driver API's [`RegisterBus`] and
//! [`ControlRegisters`] traits over an in-memory register file laid out by a
//! [`Platform`]. It records every transmitted byte and every
//! side-effecting register access in a journal so tests can assert on
//! ordering. [`SimHart`] adds time: it moves the counter forward and
//! delivers machine-timer traps to a handler closure whenever the hardware
//! would, panicking if the handler never clears the interrupt.
//!
//! [`RegisterBus`]: rivet_driver_api::RegisterBus
//! [`ControlRegisters`]: rivet_driver_api::ControlRegisters
//! [`Platform`]: rivet_driver_api::Platform

#![warn(missing_docs)]

mod hart;
mod machine;

pub use hart::{DEFAULT_LIVELOCK_LIMIT, SimHart};
pub use machine::{Event, Readiness, SimMachine};
