//! Hardware access traits for device registers and CSRs.
//!
//! These traits define the only way drivers reach hardware. Implementations
//! live in `rivet-drivers` (volatile MMIO, `csrrs`/`csrrc`) and `rivet-sim`
//! (simulated register file). Methods take `&self` because hardware state is
//! inherently shared; callers synchronize externally where needed.

use crate::csr::Csr;

/// Byte- and doubleword-granular access to memory-mapped registers.
pub trait RegisterBus {
    /// Reads an 8-bit register.
    fn read_u8(&self, addr: usize) -> u8;

    /// Writes an 8-bit register.
    fn write_u8(&self, addr: usize, value: u8);

    /// Reads a 64-bit register.
    ///
    /// On 32-bit harts the implementation must return a consistent value
    /// even if the register is counting while it is read.
    fn read_u64(&self, addr: usize) -> u64;

    /// Writes a 64-bit register.
    ///
    /// On 32-bit harts the implementation must never let the register hold
    /// an intermediate value smaller than both the old and the new value.
    fn write_u64(&self, addr: usize, value: u64);
}

/// Read, set and clear access to machine-mode control and status registers.
pub trait ControlRegisters {
    /// Reads the whole register.
    fn read(&self, csr: Csr) -> usize;

    /// Sets every bit in `mask` (`csrrs`).
    fn set_bits(&self, csr: Csr, mask: usize);

    /// Clears every bit in `mask` (`csrrc`).
    fn clear_bits(&self, csr: Csr, mask: usize);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &T {
    fn read_u8(&self, addr: usize) -> u8 {
        (**self).read_u8(addr)
    }

    fn write_u8(&self, addr: usize, value: u8) {
        (**self).write_u8(addr, value);
    }

    fn read_u64(&self, addr: usize) -> u64 {
        (**self).read_u64(addr)
    }

    fn write_u64(&self, addr: usize, value: u64) {
        (**self).write_u64(addr, value);
    }
}

impl<T: ControlRegisters + ?Sized> ControlRegisters for &T {
    fn read(&self, csr: Csr) -> usize {
        (**self).read(csr)
    }

    fn set_bits(&self, csr: Csr, mask: usize) {
        (**self).set_bits(csr, mask);
    }

    fn clear_bits(&self, csr: Csr, mask: usize) {
        (**self).clear_bits(csr, mask);
    }
}
