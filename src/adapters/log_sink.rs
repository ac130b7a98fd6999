//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the ESP-IDF logger on target, so UART / USB-CDC in
//! production).  Snapshot dumps and ignored reader lines go out at debug
//! level; everything that changes the pending scan is info or above.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { gates, baseline } => {
                info!("START | gates={} | baseline={}", gates, baseline);
            }
            AppEvent::ScanAccepted {
                identifier,
                timeout_secs,
            } => {
                info!(
                    "SCAN | spool={} | waiting up to {}s for a gate",
                    identifier, timeout_secs
                );
            }
            AppEvent::ScanReplaced { discarded } => {
                info!("SCAN | discarded unmatched spool={}", discarded);
            }
            AppEvent::BaselineCaptured(snap) => {
                debug!("SNAP | after scan {}", snap);
            }
            AppEvent::SnapshotChecked(snap) => {
                debug!("SNAP | {}", snap);
            }
            AppEvent::ScanExpired { identifier } => {
                info!("EXPIRE | spool={} | no gate assignment", identifier);
            }
            AppEvent::GateMatched {
                identifier,
                gate,
                command,
            } => {
                info!("MATCH | spool={} gate={} | {}", identifier, gate, command);
            }
            AppEvent::DispatchFailed { command, reason } => {
                warn!("DISPATCH | failed '{}': {}", command, reason);
            }
            AppEvent::LineIgnored(line) => {
                debug!("READER | {}", line);
            }
        }
    }
}
