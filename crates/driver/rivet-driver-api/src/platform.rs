//! Platform description: where the console and timer registers live.

use crate::csr::{Csr, CsrBit};
use crate::error::DriverError;

/// Addresses and bits the runtime needs on a particular board.
///
/// Every driver takes one of these instead of hard-coding constants, so the
/// same code runs against QEMU, real silicon and the simulated machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    /// UART transmit holding register.
    pub tx_addr: usize,
    /// UART line status register.
    pub ready_addr: usize,
    /// Bit in the status register that reads 1 when TX can accept a byte.
    pub ready_bit: u8,
    /// 64-bit free-running machine timer counter (`mtime`).
    pub counter_addr: usize,
    /// 64-bit timer compare register for hart 0 (`mtimecmp`).
    pub compare_addr: usize,
    /// Global machine interrupt enable.
    pub global_enable: CsrBit,
    /// Per-source enable for the machine timer.
    pub timer_enable: CsrBit,
}

impl PlatformConfig {
    /// QEMU `virt` machine, hart 0.
    pub const QEMU_VIRT: Self = Self {
        tx_addr: 0x1000_0000,
        ready_addr: 0x1000_0005,
        ready_bit: 5,
        counter_addr: 0x0200_BFF8,
        compare_addr: 0x0200_4000,
        global_enable: CsrBit::new(Csr::Mstatus, 3),
        timer_enable: CsrBit::new(Csr::Mie, 7),
    };

    /// Checks that the description is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidConfig`] if a bit index does not fit
    /// its register, a 64-bit timer register is misaligned, or two
    /// registers overlap.
    pub const fn validate(&self) -> Result<(), DriverError> {
        if self.ready_bit >= 8 {
            return Err(DriverError::InvalidConfig("ready bit out of range"));
        }
        if self.global_enable.bit as u32 >= usize::BITS
            || self.timer_enable.bit as u32 >= usize::BITS
        {
            return Err(DriverError::InvalidConfig("enable bit out of range"));
        }
        if self.counter_addr % 8 != 0 || self.compare_addr % 8 != 0 {
            return Err(DriverError::InvalidConfig("timer register misaligned"));
        }
        if self.tx_addr == self.ready_addr {
            return Err(DriverError::InvalidConfig("tx and status registers overlap"));
        }
        if self.counter_addr.abs_diff(self.compare_addr) < 8 {
            return Err(DriverError::InvalidConfig("counter and compare registers overlap"));
        }
        Ok(())
    }
}

/// A [`PlatformConfig`] that passed [`validate`](PlatformConfig::validate).
///
/// Driver constructors take this rather than a raw description, so an
/// out-of-range bit or a misplaced register is rejected once, before any
/// driver derives a mask or an address from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform(PlatformConfig);

impl Platform {
    /// QEMU `virt` machine, hart 0.
    pub const QEMU_VIRT: Self = match Self::new(PlatformConfig::QEMU_VIRT) {
        Ok(platform) => platform,
        Err(_) => panic!("QEMU virt platform description is invalid"),
    };

    /// Validates `config`.
    ///
    /// # Errors
    ///
    /// Returns the error from [`PlatformConfig::validate`].
    pub const fn new(config: PlatformConfig) -> Result<Self, DriverError> {
        match config.validate() {
            Ok(()) => Ok(Self(config)),
            Err(err) => Err(err),
        }
    }

    /// Returns the validated description.
    pub const fn config(&self) -> &PlatformConfig {
        &self.0
    }
}

impl core::ops::Deref for Platform {
    type Target = PlatformConfig;

    fn deref(&self) -> &PlatformConfig {
        &self.0
    }
}
