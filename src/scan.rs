//! NFC reader line protocol.
//!
//! The reader prints one text line per event.  Exactly one line shape is
//! meaningful to the firmware:
//!
//! ```text
//! SET_SPOOL_ID ID=<identifier>\r\n
//! ```
//!
//! Everything else (boot banners, debug chatter) is [`ScanLine::Ignored`].
//! The identifier is opaque: it is trimmed and otherwise passed through
//! untouched.
//!
//! [`LineAssembler`] sits in front of the parser and turns the raw UART
//! byte stream into lines.  It handles partial reads (a single UART read
//! may return half a line or several lines) and bounds memory use.

use log::warn;

/// Marker that introduces a scanned identifier.
pub const SCAN_PREFIX: &str = "SET_SPOOL_ID ID=";

/// Longest line the assembler will buffer before discarding it.
pub const MAX_LINE_LEN: usize = 256;

/// A successfully recognised scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub identifier: String,
}

/// Classification of one reader line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanLine {
    Scan(ScanEvent),
    Ignored,
}

/// Classify a raw reader line.
///
/// Surrounding whitespace on the line is ignored, so `"  SET_SPOOL_ID ID=7 \r"`
/// is still a scan of `"7"`.  An empty identifier is still a scan.  The
/// identifier ends at a repeated marker, so two scans glued onto one line
/// yield the first.
pub fn parse_line(raw: &str) -> ScanLine {
    match raw.trim().strip_prefix(SCAN_PREFIX) {
        Some(rest) => {
            let id = rest.split(SCAN_PREFIX).next().unwrap_or_default();
            ScanLine::Scan(ScanEvent {
                identifier: id.trim().to_string(),
            })
        }
        None => ScanLine::Ignored,
    }
}

// ---------------------------------------------------------------------------
// Line assembler
// ---------------------------------------------------------------------------

/// Streaming byte → line splitter.
pub struct LineAssembler {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    /// Set when the current line outgrew `buf`; cleared at the next `\n`.
    overflowed: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            overflowed: false,
        }
    }

    /// Push one byte.  Returns a line when `byte` completes a non-blank one.
    ///
    /// The returned line has its terminator removed and any bytes that are
    /// not valid UTF-8 dropped.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte == b'\n' {
            let overflowed = self.overflowed;
            let line = decode_lossless(&self.buf);
            self.reset();
            if overflowed {
                warn!("Reader line exceeded {} bytes, discarded", MAX_LINE_LEN);
                return None;
            }
            let trimmed = line.trim_end_matches('\r');
            if trimmed.trim().is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }

        if self.overflowed {
            return None;
        }
        if self.buf.push(byte).is_err() {
            self.overflowed = true;
        }
        None
    }

    /// Push a chunk of bytes, handing every completed line to `on_line`.
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(String)) {
        for &byte in data {
            if let Some(line) = self.push(byte) {
                on_line(line);
            }
        }
    }

    /// Drop any partially received line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }

    /// Bytes buffered for the line in progress.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

/// Decode, skipping invalid UTF-8 sequences rather than replacing them.
fn decode_lossless(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
