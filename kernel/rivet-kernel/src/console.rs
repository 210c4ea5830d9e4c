//! Console-backed print and log sinks.
//!
//! [`ConsoleLogger`] is what the firmware registers behind `kprint!` and
//! `klog!`. Every record is written under an [`IrqSpinLock`], so the timer
//! handler (which writes its marker straight to the UART and never takes
//! this lock) cannot land in the middle of a foreground line.

use core::fmt;

use rivet_core::log::{self, LogLevel};
use rivet_core::sync::IrqSpinLock;
use rivet_driver_api::RegisterBus;
use rivet_drivers::uart::Console;

/// Serialized console output with a level filter.
pub struct ConsoleLogger<B> {
    console: Console<B>,
    max_level: LogLevel,
    lock: IrqSpinLock<()>,
}

impl<B: RegisterBus> ConsoleLogger<B> {
    /// Creates a logger writing to `console`. Records above `max_level` are
    /// dropped.
    pub const fn new(console: Console<B>, max_level: LogLevel) -> Self {
        Self {
            console,
            max_level,
            lock: IrqSpinLock::new(()),
        }
    }

    /// Writes formatted text as-is.
    pub fn print(&self, args: fmt::Arguments<'_>) {
        let _guard = self.lock.lock();
        let _ = fmt::write(&mut Writer(&self.console), args);
    }

    /// Writes one `[LEVEL] message` record if `level` passes the filter.
    pub fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level > self.max_level {
            return;
        }
        let _guard = self.lock.lock();
        let _ = log::write_record(&mut Writer(&self.console), level, args);
    }

    /// Returns the level filter.
    pub fn max_level(&self) -> LogLevel {
        self.max_level
    }

    /// Returns the console, for lock-free writers (trap and panic paths).
    pub fn console(&self) -> &Console<B> {
        &self.console
    }
}

struct Writer<'a, B>(&'a Console<B>);

impl<B: RegisterBus> fmt::Write for Writer<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_string(s);
        Ok(())
    }
}
