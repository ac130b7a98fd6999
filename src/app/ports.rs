//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CorrelationEngine (domain)
//! ```
//!
//! Driven adapters (NFC reader, Moonraker, logger, clock) implement these
//! traits.  The [`CorrelationEngine`](super::service::CorrelationEngine)
//! owns its collaborators as generics, so the domain core never touches
//! UART or HTTP directly and tests can substitute fakes.
//!
//! ## Failure contracts
//!
//! - **ScanSource** errors are fatal to the run loop.
//! - **GateSensorPort** never fails: problems degrade readings to `Unknown`.
//! - **CommandSink** errors are reported back but never retried.

use core::fmt;

use crate::gates::GateSnapshot;

// ───────────────────────────────────────────────────────────────
// Identifier source (driven adapter: NFC reader → domain)
// ───────────────────────────────────────────────────────────────

/// Line-oriented source of reader output.
pub trait ScanSource {
    /// Wait at most `timeout_ms` for one complete line.
    ///
    /// `Ok(None)` means nothing arrived in time, which is not an error.
    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<String>, SerialError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor snapshot provider (driven adapter: printer host → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the gate filament sensors.
pub trait GateSensorPort {
    /// Read gates `0..gate_count` in a single query.
    ///
    /// Must return exactly `gate_count` readings.  Transport or decode
    /// failures are absorbed here and show up as `Unknown` readings.
    fn query(&mut self, gate_count: usize) -> GateSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Command sink (driven adapter: domain → printer host)
// ───────────────────────────────────────────────────────────────

/// Write-side port for G-code commands.  Fire-and-forget.
pub trait CommandSink {
    fn send(&mut self, command: &str) -> Result<(), DispatchError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus a blocking delay, used by the run loop.
pub trait TimePort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// HTTP transport (used by the Moonraker adapter)
// ───────────────────────────────────────────────────────────────

/// Status code and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal blocking HTTP client: JSON POST to a path under a base URL.
pub trait HttpTransport {
    fn post_json(
        &mut self,
        path: &str,
        body: &str,
        timeout_ms: u32,
    ) -> Result<HttpResponse, HttpError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ScanSource`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// The UART driver could not be installed.
    OpenFailed,
    /// The driver returned an error mid-read.
    ReadFailed,
    /// The source has no more data and never will (simulation only).
    Closed,
}

/// Errors from [`HttpTransport`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// No connection could be established.
    Connect,
    /// Request write or response read failed (includes timeouts).
    Io,
    /// Server answered with a non-2xx status.
    Status(u16),
}

/// Errors from [`CommandSink`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The command could not be serialised into a request body.
    Encode,
    /// The request failed on the wire.
    Http(HttpError),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed => write!(f, "serial port could not be opened"),
            Self::ReadFailed => write!(f, "serial read failed"),
            Self::Closed => write!(f, "serial source closed"),
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Io => write!(f, "I/O error"),
            Self::Status(code) => write!(f, "HTTP status {}", code),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "could not encode command"),
            Self::Http(e) => write!(f, "HTTP: {}", e),
        }
    }
}

impl From<HttpError> for DispatchError {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

impl std::error::Error for SerialError {}
impl std::error::Error for HttpError {}
impl std::error::Error for DispatchError {}
