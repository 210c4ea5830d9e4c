//! Polled UART console.
//!
//! Provides a [`Console`] that transmits bytes by spinning on the line
//! status register and then storing to the transmit holding register. There
//! is no receive path, no FIFO setup and no interrupt use: QEMU's `virt`
//! UART comes out of reset ready to send.

use core::fmt;

use bitflags::bitflags;
use rivet_driver_api::{ConsoleSink, DriverError, Platform, RegisterBus};

bitflags! {
    /// Line Status Register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Lsr: u8 {
        /// Data ready (received data available).
        const DATA_READY = 1 << 0;
        /// Transmit Holding Register empty.
        const THR_EMPTY  = 1 << 5;
    }
}

/// A transmit-only UART reached through a [`RegisterBus`].
///
/// This type is `Copy` when the bus is and carries nothing beyond two
/// register addresses and a mask, so it can be rebuilt anywhere (the panic
/// handler, a trap handler) without coordination.
#[derive(Debug, Clone, Copy)]
pub struct Console<B> {
    bus: B,
    tx: usize,
    status: usize,
    ready: Lsr,
}

impl<B: RegisterBus> Console<B> {
    /// Creates a console handle. Does **not** touch hardware.
    #[must_use]
    pub const fn new(bus: B, platform: &Platform) -> Self {
        let config = platform.config();
        Self {
            bus,
            tx: config.tx_addr,
            status: config.ready_addr,
            ready: Lsr::from_bits_retain(1 << config.ready_bit),
        }
    }

    /// Returns the current Line Status Register value.
    #[must_use]
    pub fn line_status(&self) -> Lsr {
        Lsr::from_bits_retain(self.bus.read_u8(self.status))
    }

    /// Returns `true` if the transmitter can accept a byte (non-blocking).
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.line_status().contains(self.ready)
    }

    /// Writes a single byte, busy-waiting until the transmitter is ready.
    ///
    /// Never returns if the device never becomes ready.
    pub fn write_byte(&self, byte: u8) {
        while !self.is_ready() {
            core::hint::spin_loop();
        }
        self.bus.write_u8(self.tx, byte);
    }

    /// Writes a single byte, polling the status register at most
    /// `max_polls` times.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotReady`] without writing if the device did
    /// not report ready in time.
    pub fn try_write_byte(&self, byte: u8, max_polls: u32) -> Result<(), DriverError> {
        for _ in 0..max_polls {
            if self.is_ready() {
                self.bus.write_u8(self.tx, byte);
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(DriverError::NotReady)
    }

    /// Writes every byte of `s` in order. No terminator, no newline
    /// translation.
    pub fn write_string(&self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Writes every byte of `bytes` in order.
    pub fn write_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }
}

impl<B: RegisterBus> ConsoleSink for Console<B> {
    fn write_byte(&self, byte: u8) {
        Console::write_byte(self, byte);
    }
}

impl<B: RegisterBus> fmt::Write for Console<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}
