//! Rivet firmware support library.
//!
//! Everything the firmware image needs that is not tied to the target:
//! compile-time configuration, the console-backed logger and the mutex
//! demonstration tasks. Keeping these here lets the host test them.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod tasks;
