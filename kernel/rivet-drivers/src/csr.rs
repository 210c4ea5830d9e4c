//! Machine-mode CSR access through `csrr`/`csrrs`/`csrrc`.

use core::arch::asm;

use rivet_driver_api::{ControlRegisters, Csr};

/// The executing hart's machine-mode CSRs.
///
/// Set and clear are single atomic read-modify-write instructions, so a
/// trap between them cannot lose an update.
#[derive(Debug, Clone, Copy)]
pub struct MachineCsr {
    _private: (),
}

impl MachineCsr {
    /// Creates a handle to the current hart's CSRs.
    ///
    /// # Safety
    ///
    /// The caller must be running in machine mode. Flipping interrupt enable
    /// bits through this handle can start trap delivery; handlers must be in
    /// place first.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

macro_rules! csr_dispatch {
    ($csr:expr, $pre:literal, $post:literal, $($operands:tt)*) => {
        match $csr {
            Csr::Mstatus => asm!(concat!($pre, "mstatus", $post), $($operands)*),
            Csr::Mie => asm!(concat!($pre, "mie", $post), $($operands)*),
            Csr::Mip => asm!(concat!($pre, "mip", $post), $($operands)*),
        }
    };
}

impl ControlRegisters for MachineCsr {
    #[inline]
    fn read(&self, csr: Csr) -> usize {
        let value: usize;
        // SAFETY: reading a machine CSR has no side effects; `new` contract
        // guarantees machine mode.
        unsafe {
            csr_dispatch!(csr, "csrr {0}, ", "", out(reg) value, options(nomem, nostack));
        }
        value
    }

    #[inline]
    fn set_bits(&self, csr: Csr, mask: usize) {
        // SAFETY: `new` contract. Not `nomem`: stores before an enable must
        // stay before it.
        unsafe {
            csr_dispatch!(csr, "csrs ", ", {0}", in(reg) mask, options(nostack));
        }
    }

    #[inline]
    fn clear_bits(&self, csr: Csr, mask: usize) {
        // SAFETY: `new` contract.
        unsafe {
            csr_dispatch!(csr, "csrc ", ", {0}", in(reg) mask, options(nostack));
        }
    }
}
