//! Volatile memory-mapped register access.

use rivet_driver_api::RegisterBus;

/// The physical address space, accessed with volatile loads and stores.
///
/// Zero-sized and `Copy`: every driver can hold its own handle.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Creates a handle to physical memory.
    ///
    /// # Safety
    ///
    /// Every address later passed through this handle must be a mapped
    /// device register of the accessed width, naturally aligned. Machine
    /// mode with no MMU satisfies the mapping half on QEMU `virt`.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline]
    fn read_u8(&self, addr: usize) -> u8 {
        // SAFETY: `Mmio::new` contract.
        unsafe { core::ptr::read_volatile(addr as *const u8) }
    }

    #[inline]
    fn write_u8(&self, addr: usize, value: u8) {
        // SAFETY: `Mmio::new` contract.
        unsafe { core::ptr::write_volatile(addr as *mut u8, value) }
    }

    #[cfg(target_pointer_width = "64")]
    #[inline]
    fn read_u64(&self, addr: usize) -> u64 {
        // SAFETY: `Mmio::new` contract.
        unsafe { core::ptr::read_volatile(addr as *const u64) }
    }

    #[cfg(target_pointer_width = "64")]
    #[inline]
    fn write_u64(&self, addr: usize, value: u64) {
        // SAFETY: `Mmio::new` contract.
        unsafe { core::ptr::write_volatile(addr as *mut u64, value) }
    }

    #[cfg(not(target_pointer_width = "64"))]
    fn read_u64(&self, addr: usize) -> u64 {
        // SAFETY: `Mmio::new` contract; both halves lie inside the register.
        read_split(
            || unsafe { core::ptr::read_volatile((addr + 4) as *const u32) },
            || unsafe { core::ptr::read_volatile(addr as *const u32) },
        )
    }

    #[cfg(not(target_pointer_width = "64"))]
    fn write_u64(&self, addr: usize, value: u64) {
        // SAFETY: `Mmio::new` contract; both halves lie inside the register.
        write_split(
            |lo| unsafe { core::ptr::write_volatile(addr as *mut u32, lo) },
            |hi| unsafe { core::ptr::write_volatile((addr + 4) as *mut u32, hi) },
            value,
        );
    }
}

/// Reads a counting 64-bit register as two halves.
///
/// Re-reads until the high half is stable around the low read, so a carry
/// out of the low half between the two loads is never observed.
#[cfg_attr(target_pointer_width = "64", allow(dead_code))]
fn read_split(mut read_hi: impl FnMut() -> u32, mut read_lo: impl FnMut() -> u32) -> u64 {
    loop {
        let hi = read_hi();
        let lo = read_lo();
        if read_hi() == hi {
            return (u64::from(hi) << 32) | u64::from(lo);
        }
    }
}

/// Writes a 64-bit compare register as two halves.
///
/// The low half is parked at `u32::MAX` while the high half changes, so the
/// register never passes through a value below both the old and new
/// contents and cannot raise a spurious early match.
#[cfg_attr(target_pointer_width = "64", allow(dead_code))]
fn write_split(mut write_lo: impl FnMut(u32), mut write_hi: impl FnMut(u32), value: u64) {
    write_lo(u32::MAX);
    write_hi((value >> 32) as u32);
    write_lo(value as u32);
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[test]
    fn volatile_byte_access() {
        let mut cell = [0u8; 4];
        let bus = unsafe { Mmio::new() };
        let addr = cell.as_mut_ptr() as usize + 2;
        bus.write_u8(addr, 0xA5);
        assert_eq!(bus.read_u8(addr), 0xA5);
        assert_eq!(cell, [0, 0, 0xA5, 0]);
    }

    #[test]
    fn volatile_doubleword_access() {
        let mut reg = 0u64;
        let bus = unsafe { Mmio::new() };
        let addr = &raw mut reg as usize;
        bus.write_u64(addr, 0x0123_4567_89AB_CDEF);
        assert_eq!(bus.read_u64(addr), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn split_read_retries_on_carry() {
        // hi reads: 0 (before), 1 (after carry) -> retry; 1, 1 -> stable.
        let his = [0u32, 1, 1, 1];
        let los = [u32::MAX, 3];
        let hi_idx = Cell::new(0);
        let lo_idx = Cell::new(0);
        let value = read_split(
            || {
                let v = his[hi_idx.get()];
                hi_idx.set(hi_idx.get() + 1);
                v
            },
            || {
                let v = los[lo_idx.get()];
                lo_idx.set(lo_idx.get() + 1);
                v
            },
        );
        assert_eq!(value, (1 << 32) | 3);
        assert_eq!(lo_idx.get(), 2);
    }

    #[test]
    fn split_write_parks_low_half() {
        let ops = RefCell::new(Vec::new());
        write_split(
            |lo| ops.borrow_mut().push(("lo", lo)),
            |hi| ops.borrow_mut().push(("hi", hi)),
            0x0000_0002_0000_0001,
        );
        assert_eq!(*ops.borrow(), [("lo", u32::MAX), ("hi", 2), ("lo", 1)]);
    }
}
