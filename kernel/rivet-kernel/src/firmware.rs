//! Bare-metal boot, trap glue and panic handling.

use core::panic::PanicInfo;

use riscv_rt::entry;
use rivet_core::log::{self, LogLevel};
use rivet_core::sync::IrqSpinLock;
use rivet_core::{interrupts, kdebug, kinfo, kprint, kprintln};
use rivet_driver_api::ControlRegisters;
use rivet_drivers::clint::Clint;
use rivet_drivers::timer::{self, Enabled};
use rivet_drivers::uart::Console;
use rivet_drivers::{MachineCsr, Mmio};
use rivet_kernel::config::{IDLE_DELAY, MAX_LOG_LEVEL, PLATFORM, TASK_ROUNDS, TICK_INTERVAL, VERSION};
use rivet_kernel::console::ConsoleLogger;
use rivet_kernel::tasks::{self, SharedCounter};

// SAFETY: machine mode on QEMU `virt` with no MMU; every address the
// drivers use comes from `PLATFORM`, which describes real registers.
const BUS: Mmio = unsafe { Mmio::new() };

static LOGGER: ConsoleLogger<Mmio> =
    ConsoleLogger::new(Console::new(BUS, &PLATFORM), MAX_LOG_LEVEL);

type Timer = timer::MachineTimer<Mmio, MachineCsr, Enabled>;

/// The running timer, published before the global interrupt enable.
static TIMER: IrqSpinLock<Option<Timer>> = IrqSpinLock::new(None);

static COUNTER: SharedCounter = SharedCounter::new(0);

fn print(args: core::fmt::Arguments<'_>) {
    LOGGER.print(args);
}

fn log(level: LogLevel, args: core::fmt::Arguments<'_>) {
    LOGGER.log(level, args);
}

#[entry]
fn main() -> ! {
    // Earliest sign of life, before any logging is wired up.
    LOGGER.console().write_byte(b'A');

    // SAFETY: both functions only touch `LOGGER`, which masks interrupts
    // while it writes and is safe from every foreground context.
    unsafe {
        log::set_print_fn(print);
        log::set_log_fn(log);
    }
    kinfo!("rivet {VERSION}: log level {}", MAX_LOG_LEVEL.name().trim_end());

    // SAFETY: we run in machine mode, and `MachineTimer` below is linked in
    // as the trap target before the global enable is set.
    let csr = unsafe { MachineCsr::new() };
    let armed = timer::MachineTimer::new(BUS, csr, &PLATFORM).arm(TICK_INTERVAL);
    kdebug!("timer: first deadline {} (+{})", armed.deadline(), TICK_INTERVAL);
    armed.enable_with(|timer| *TIMER.lock() = Some(timer));
    kprintln!("Timer enabled");

    // The critical sections below can now be interrupted by the timer.
    kprint!("Starting threads\n");
    tasks::run_interleaved(&COUNTER, TASK_ROUNDS);
    kprintln!("Done");

    let clint = Clint::new(BUS, &PLATFORM);
    loop {
        kprint!(".");
        clint.delay(IDLE_DELAY);
    }
}

/// Machine timer interrupt, dispatched by `riscv-rt`.
#[allow(non_snake_case)]
#[no_mangle]
extern "C" fn MachineTimer() {
    // The foreground only holds `TIMER` with interrupts masked, so this
    // cannot fail while a timer is installed.
    if let Some(guard) = TIMER.try_lock() {
        if let Some(timer) = guard.as_ref() {
            timer.handle_interrupt(LOGGER.console());
            return;
        }
    }
    // Nothing can reprogram the comparator: mask the source instead of
    // re-entering forever.
    // SAFETY: machine mode, trap context.
    let csr = unsafe { MachineCsr::new() };
    csr.clear_bits(PLATFORM.timer_enable.csr, PLATFORM.timer_enable.mask());
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    interrupts::disable();
    // No locks: the panic may have happened while the logger was held.
    let mut console = *LOGGER.console();
    let _ = log::write_record(&mut console, LogLevel::Fatal, format_args!("{info}"));
    loop {
        // SAFETY: `wfi` only stalls the hart.
        unsafe { core::arch::asm!("wfi", options(nomem, nostack)) };
    }
}
