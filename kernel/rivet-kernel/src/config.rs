//! Firmware configuration bridge.
//!
//! Resolves build-environment settings into typed constants at compile
//! time, so there is a single source of truth for every tunable:
//!
//! | variable              | constant          | default     |
//! |-----------------------|-------------------|-------------|
//! | `RIVET_LOG_LEVEL`     | [`MAX_LOG_LEVEL`] | `info`      |
//! | `RIVET_TICK_INTERVAL` | [`TICK_INTERVAL`] | `1000000`   |

use core::num::NonZeroU64;

use rivet_core::log::LogLevel;
use rivet_driver_api::Platform;

/// Maximum log level (compile-time). Records above it are dropped by the
/// console logger.
pub const MAX_LOG_LEVEL: LogLevel = match resolve_level(option_env!("RIVET_LOG_LEVEL")) {
    Some(level) => level,
    None => panic!("RIVET_LOG_LEVEL must be one of fatal, error, warn, info, debug, trace"),
};

/// Timer period in `mtime` ticks. QEMU `virt` counts at 10 MHz.
pub const TICK_INTERVAL: NonZeroU64 = match option_env!("RIVET_TICK_INTERVAL") {
    Some(text) => match parse_ticks(text) {
        Some(ticks) => ticks,
        None => panic!("RIVET_TICK_INTERVAL must be a positive decimal integer"),
    },
    None => match NonZeroU64::new(1_000_000) {
        Some(ticks) => ticks,
        None => unreachable!(),
    },
};

/// Critical-section rounds each demo task runs.
pub const TASK_ROUNDS: usize = 2;

/// Counter ticks the idle loop waits between progress dots.
pub const IDLE_DELAY: u64 = 100_000;

/// Board the firmware is built for.
pub const PLATFORM: Platform = Platform::QEMU_VIRT;

/// Project version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unset means `info`; a set but unknown name is `None`.
const fn resolve_level(setting: Option<&str>) -> Option<LogLevel> {
    match setting {
        Some(name) => LogLevel::from_name(name),
        None => Some(LogLevel::Info),
    }
}

const fn parse_ticks(text: &str) -> Option<NonZeroU64> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'_' {
            i += 1;
            continue;
        }
        if !b.is_ascii_digit() {
            return None;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u64) {
                Some(v) => v,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    NonZeroU64::new(value)
}
