//! Unified error types for the spool-gate firmware.
//!
//! A single `Error` enum that every startup and run-loop failure converts
//! into, keeping `main`'s error handling uniform.  Recoverable failures
//! (sensor queries, command dispatch) never reach this type: they are
//! absorbed at the port boundary.

use core::fmt;

use crate::app::ports::SerialError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fatal condition in the firmware funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid.
    Config(&'static str),
    /// Peripheral or network initialisation failed.
    Init(&'static str),
    /// The NFC reader could not be opened or stopped delivering data.
    Serial(SerialError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Serial(e) => write!(f, "serial: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<SerialError> for Error {
    fn from(e: SerialError) -> Self {
        Self::Serial(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
