//! NFC reader adapter.
//!
//! Implements [`ScanSource`] on top of a byte stream, using
//! [`LineAssembler`] to cut it into lines.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`UartScanSource`] reads the ESP-IDF UART
//!   driver with a bounded wait.
//! - **all other targets**: [`SimScanSource`] replays scripted byte chunks,
//!   one chunk per read, for host-side tests.

use std::collections::VecDeque;

use crate::app::ports::{ScanSource, SerialError};
use crate::scan::LineAssembler;

#[cfg(target_os = "espidf")]
pub use esp::UartScanSource;

#[cfg(target_os = "espidf")]
mod esp {
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    use esp_idf_hal::delay::TickType;
    use esp_idf_hal::uart::UartDriver;
    use log::warn;

    use crate::app::ports::{ScanSource, SerialError};
    use crate::scan::LineAssembler;

    const READ_CHUNK: usize = 64;

    /// Reader wired to an ESP-IDF UART.
    pub struct UartScanSource {
        uart: UartDriver<'static>,
        assembler: LineAssembler,
        ready: VecDeque<String>,
    }

    impl UartScanSource {
        pub fn new(uart: UartDriver<'static>) -> Self {
            Self {
                uart,
                assembler: LineAssembler::new(),
                ready: VecDeque::new(),
            }
        }
    }

    impl ScanSource for UartScanSource {
        fn read_line(&mut self, timeout_ms: u32) -> Result<Option<String>, SerialError> {
            if let Some(line) = self.ready.pop_front() {
                return Ok(Some(line));
            }

            let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
            let mut buf = [0u8; READ_CHUNK];
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok(None);
                }
                let ticks = TickType::new_millis(remaining.as_millis() as u64).ticks();
                let n = self.uart.read(&mut buf, ticks).map_err(|e| {
                    warn!("UART RX error: {:?}", e);
                    SerialError::ReadFailed
                })?;
                if n == 0 {
                    continue;
                }
                self.assembler
                    .feed(&buf[..n], |line| self.ready.push_back(line));
                if let Some(line) = self.ready.pop_front() {
                    return Ok(Some(line));
                }
            }
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

/// Scripted reader: each queued chunk is what one UART read returns.
#[derive(Default)]
pub struct SimScanSource {
    chunks: VecDeque<Vec<u8>>,
    assembler: LineAssembler,
    ready: VecDeque<String>,
    closed: bool,
    reads: u32,
}

impl SimScanSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes as a single read.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.chunks.push_back(bytes.to_vec());
    }

    /// Queue one `\r\n`-terminated line as a single read.
    pub fn push_line(&mut self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        self.chunks.push_back(bytes);
    }

    /// Queue a read that returns nothing (a timeout).
    pub fn push_silence(&mut self) {
        self.chunks.push_back(Vec::new());
    }

    /// Once the queue drains, fail the next read as a dead reader would.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Number of `read_line` calls so far.
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl ScanSource for SimScanSource {
    fn read_line(&mut self, _timeout_ms: u32) -> Result<Option<String>, SerialError> {
        self.reads += 1;
        if let Some(line) = self.ready.pop_front() {
            return Ok(Some(line));
        }
        match self.chunks.pop_front() {
            Some(chunk) => {
                self.assembler
                    .feed(&chunk, |line| self.ready.push_back(line));
                Ok(self.ready.pop_front())
            }
            None if self.closed => Err(SerialError::Closed),
            None => Ok(None),
        }
    }
}
