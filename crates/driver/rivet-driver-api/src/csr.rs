//! Machine-mode CSR identifiers and bit layouts.

use bitflags::bitflags;

/// The machine-mode CSRs the runtime touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Csr {
    /// Machine status (`0x300`), holds the global interrupt enable.
    Mstatus,
    /// Machine interrupt enable (`0x304`), one bit per interrupt source.
    Mie,
    /// Machine interrupt pending (`0x344`), read-only for the timer bit.
    Mip,
}

/// A single bit in a CSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrBit {
    /// Register holding the bit.
    pub csr: Csr,
    /// Bit index, counted from the least significant bit.
    pub bit: u8,
}

impl CsrBit {
    /// Creates a bit reference.
    pub const fn new(csr: Csr, bit: u8) -> Self {
        Self { csr, bit }
    }

    /// Returns the bit as a mask for `csrrs`/`csrrc`.
    ///
    /// Only meaningful for bits below `usize::BITS`; see
    /// [`PlatformConfig::validate`](crate::PlatformConfig::validate).
    pub const fn mask(self) -> usize {
        1 << self.bit
    }
}

bitflags! {
    /// `mstatus` bits used by the runtime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mstatus: usize {
        /// Machine interrupt enable (global).
        const MIE = 1 << 3;
    }
}

bitflags! {
    /// `mie` / `mip` bits used by the runtime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mie: usize {
        /// Machine timer interrupt.
        const MTIE = 1 << 7;
    }
}
