//! Outbound application events.
//!
//! The [`CorrelationEngine`](super::service::CorrelationEngine) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to the console, count
//! them in a test, etc.

use crate::gates::{GateId, GateSnapshot};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Engine is running; carries the initial baseline.
    Started { gates: usize, baseline: GateSnapshot },

    /// A reader line was recognised as a scan.
    ScanAccepted {
        identifier: String,
        timeout_secs: u32,
    },

    /// A newer scan replaced one that never matched.
    ScanReplaced { discarded: String },

    /// Edge-detection baseline taken right after a scan.
    BaselineCaptured(GateSnapshot),

    /// Snapshot fetched during a pending-scan check.
    SnapshotChecked(GateSnapshot),

    /// Pending scan reached its deadline without a gate edge.
    ScanExpired { identifier: String },

    /// A gate rose while a scan was pending; the command was sent.
    GateMatched {
        identifier: String,
        gate: GateId,
        command: String,
    },

    /// The command for a match could not be delivered.  Not retried.
    DispatchFailed { command: String, reason: String },

    /// A reader line that is not a scan.
    LineIgnored(String),
}
