//! Core synchronization primitives and logging for the Rivet runtime.
//!
//! This crate holds the parts of the runtime that do not touch device
//! registers: the LR/SC lock word and the locks built on it, machine
//! interrupt masking, and the leveled logging macros.
//!
//! Everything here is host-testable with `cargo test`. The lock word can
//! additionally be model-checked with `--cfg loom` and `--cfg shuttle`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod interrupts;
pub mod log;
pub mod sync;
