//! Rivet firmware entry point.
//!
//! On `riscv*-unknown-none-elf` this is the bare-metal image QEMU boots. On
//! the host the same boot sequence runs against the simulated machine, with
//! the UART echoed to stdout.

#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
mod firmware;

#[cfg(not(target_os = "none"))]
mod host;

#[cfg(not(target_os = "none"))]
fn main() {
    host::run();
}
