//! Host run: the firmware's boot sequence on a simulated machine.
//!
//! The demo tasks become real threads contending for the lock, and the
//! timer runs for a handful of periods on a simulated hart before the
//! process exits.

use std::sync::OnceLock;

use rivet_core::log::{self, LogLevel};
use rivet_core::{kinfo, kprint, kprintln, kwarn};
use rivet_drivers::clint::Clint;
use rivet_drivers::timer::MachineTimer;
use rivet_drivers::uart::Console;
use rivet_kernel::config::{MAX_LOG_LEVEL, PLATFORM, TASK_ROUNDS, TICK_INTERVAL, VERSION};
use rivet_kernel::console::ConsoleLogger;
use rivet_kernel::tasks::{self, SharedCounter, TASKS};
use rivet_sim::{SimHart, SimMachine};

/// Timer periods simulated before exiting.
const HOST_TICKS: u64 = 3;

/// Progress dots printed per timer period.
const DOTS_PER_TICK: u64 = 4;

static LOGGER: OnceLock<ConsoleLogger<&'static SimMachine>> = OnceLock::new();

fn print(args: core::fmt::Arguments<'_>) {
    if let Some(logger) = LOGGER.get() {
        logger.print(args);
    }
}

fn log(level: LogLevel, args: core::fmt::Arguments<'_>) {
    if let Some(logger) = LOGGER.get() {
        logger.log(level, args);
    }
}

pub fn run() {
    let machine: &'static SimMachine = Box::leak(Box::new(SimMachine::new(PLATFORM).with_echo()));
    let console = Console::new(machine, machine.config());
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(console, MAX_LOG_LEVEL));

    logger.console().write_byte(b'A');
    // SAFETY: both functions only touch `LOGGER`, which is `Sync`.
    unsafe {
        log::set_print_fn(print);
        log::set_log_fn(log);
    }
    kinfo!("rivet {VERSION} (simulated): log level {}", MAX_LOG_LEVEL.name().trim_end());

    let timer = MachineTimer::new(machine, machine, machine.config())
        .arm(TICK_INTERVAL)
        .enable();
    kprintln!("Timer enabled");

    kprint!("Starting threads\n");
    let counter = SharedCounter::new(0);
    std::thread::scope(|s| {
        for name in TASKS {
            let counter = &counter;
            s.spawn(move || {
                for _ in 0..TASK_ROUNDS {
                    tasks::critical_section(name, counter);
                }
            });
        }
    });
    kprintln!("Done");

    let expected = u32::try_from(TASKS.len() * TASK_ROUNDS).unwrap_or(u32::MAX);
    let total = counter.into_inner();
    if total != expected {
        kwarn!("counter is {total}, expected {expected}");
    }

    let hart = SimHart::new(machine);
    let clint = Clint::new(machine, machine.config());
    let step = (TICK_INTERVAL.get() / DOTS_PER_TICK).max(1);
    let end = clint.now().saturating_add(TICK_INTERVAL.get().saturating_mul(HOST_TICKS));
    while clint.now() < end {
        hart.advance_by(step, || {
            timer.handle_interrupt(logger.console());
        });
        kprint!(".");
    }
    kprintln!();
    kinfo!("{} timer interrupts handled", timer.ticks());
}
