//! Driver error types.

use core::fmt;

/// Errors that can occur during driver operations.
///
/// The blocking console and timer paths never return these; they appear on
/// configuration checks and on the bounded variants used during bring-up
/// and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The device never reported ready within the allowed number of polls.
    NotReady,
    /// The platform configuration names impossible addresses or bits.
    InvalidConfig(&'static str),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("device not ready"),
            Self::InvalidConfig(reason) => write!(f, "invalid platform configuration: {reason}"),
        }
    }
}

impl core::error::Error for DriverError {}
