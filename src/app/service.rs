//! Correlation engine — the hexagonal core.
//!
//! [`CorrelationEngine`] pairs an NFC scan with the next filament edge on a
//! gate sensor.  It owns the single pending-scan slot and the edge-detection
//! baseline; every I/O collaborator is injected at construction, making the
//! engine testable with mock adapters.
//!
//! ```text
//!  reader line ──▶ ┌──────────────────────────┐ ──▶ CommandSink
//!                  │    CorrelationEngine      │
//! GateSensorPort ─▶│ pending · baseline · edge │ ──▶ EventSink
//!                  └──────────────────────────┘
//! ```
//!
//! ## Pending-scan lifecycle
//!
//! 1. A scan line creates the pending scan, replacing any older one.
//! 2. The baseline is re-read immediately, so a gate that was already
//!    loaded before the scan can never look like a fresh load.
//! 3. Each tick first checks the deadline; an expired scan is dropped
//!    before any sensor is consulted.
//! 4. Otherwise the fresh snapshot is diffed against the baseline; the
//!    lowest gate with an `Absent → Present` edge wins, the command is
//!    sent once, and the scan is consumed whether or not the send worked.
//!
//! The engine is single-threaded by construction: there is one slot and
//! one caller.

use log::info;

use crate::config::SystemConfig;
use crate::gates::{GateId, GateSnapshot, format_command};
use crate::scan::{ScanEvent, ScanLine, parse_line};

use super::events::AppEvent;
use super::ports::{CommandSink, EventSink, GateSensorPort};

/// An identifier waiting for a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScan {
    pub identifier: String,
    pub created_at_ms: u64,
}

impl PendingScan {
    /// `true` once `timeout_ms` or more has elapsed since the scan.
    pub fn is_expired(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) >= timeout_ms
    }

    /// Milliseconds left before expiry (0 when expired).
    pub fn remaining_ms(&self, now_ms: u64, timeout_ms: u64) -> u64 {
        timeout_ms.saturating_sub(now_ms.saturating_sub(self.created_at_ms))
    }
}

/// What one [`CorrelationEngine::on_tick`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing pending; no sensors were read.
    Idle,
    /// The pending scan timed out and was dropped.
    Expired { identifier: String },
    /// A gate edge consumed the pending scan.
    Matched {
        identifier: String,
        gate: GateId,
        /// Whether the command sink accepted the command.
        delivered: bool,
    },
    /// Sensors were checked, no edge yet; the scan is still pending.
    Waiting,
}

impl TickOutcome {
    /// The caller should pause before the next tick to avoid spinning.
    pub fn needs_delay(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

/// Running totals, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub scans: u64,
    pub matches: u64,
    pub expiries: u64,
    pub replaced: u64,
    pub dispatch_failures: u64,
}

// ───────────────────────────────────────────────────────────────
// CorrelationEngine
// ───────────────────────────────────────────────────────────────

pub struct CorrelationEngine<S, C, E> {
    sensors: S,
    commands: C,
    events: E,
    gate_count: usize,
    macro_name: String,
    timeout_secs: u32,
    timeout_ms: u64,
    pending: Option<PendingScan>,
    previous: GateSnapshot,
    stats: EngineStats,
}

impl<S, C, E> CorrelationEngine<S, C, E>
where
    S: GateSensorPort,
    C: CommandSink,
    E: EventSink,
{
    /// Construct the engine.  The baseline starts all-`Unknown`; call
    /// [`start`](Self::start) to take a real one.
    pub fn new(config: &SystemConfig, sensors: S, commands: C, events: E) -> Self {
        let gate_count = config.gates();
        Self {
            sensors,
            commands,
            events,
            gate_count,
            macro_name: config.macro_name.clone(),
            timeout_secs: config.pending_timeout_secs,
            timeout_ms: config.pending_timeout_ms(),
            pending: None,
            previous: GateSnapshot::unknown(gate_count),
            stats: EngineStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Take the initial baseline.
    pub fn start(&mut self) {
        self.previous = self.fetch();
        self.events.emit(&AppEvent::Started {
            gates: self.gate_count,
            baseline: self.previous.clone(),
        });
        info!(
            "CorrelationEngine started: {} gates, macro {}, timeout {}s",
            self.gate_count, self.macro_name, self.timeout_secs
        );
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Feed one raw reader line.  Returns `true` if it was a scan.
    pub fn on_scan_line(&mut self, raw: &str, now_ms: u64) -> bool {
        match parse_line(raw) {
            ScanLine::Scan(event) => {
                self.on_scan(event, now_ms);
                true
            }
            ScanLine::Ignored => {
                self.events.emit(&AppEvent::LineIgnored(raw.to_string()));
                false
            }
        }
    }

    /// Make `event` the pending scan and re-baseline the sensors.
    pub fn on_scan(&mut self, event: ScanEvent, now_ms: u64) {
        let fresh = PendingScan {
            identifier: event.identifier,
            created_at_ms: now_ms,
        };
        if let Some(old) = self.pending.replace(fresh) {
            self.stats.replaced += 1;
            self.events.emit(&AppEvent::ScanReplaced {
                discarded: old.identifier,
            });
        }
        self.stats.scans += 1;

        if let Some(p) = &self.pending {
            self.events.emit(&AppEvent::ScanAccepted {
                identifier: p.identifier.clone(),
                timeout_secs: self.timeout_secs,
            });
        }

        self.previous = self.fetch();
        self.events
            .emit(&AppEvent::BaselineCaptured(self.previous.clone()));
    }

    // ── Per-tick correlation ──────────────────────────────────

    /// Run one correlation cycle: deadline → fetch → edge → dispatch.
    pub fn on_tick(&mut self, now_ms: u64) -> TickOutcome {
        // 1. Timeout takes priority over any edge in this tick's data.
        let expired = match &self.pending {
            None => return TickOutcome::Idle,
            Some(p) => p.is_expired(now_ms, self.timeout_ms),
        };
        if expired {
            let identifier = self
                .pending
                .take()
                .map(|p| p.identifier)
                .unwrap_or_default();
            self.stats.expiries += 1;
            self.events.emit(&AppEvent::ScanExpired {
                identifier: identifier.clone(),
            });
            return TickOutcome::Expired { identifier };
        }

        // 2. Fresh snapshot, diffed against the baseline.
        let current = self.fetch();
        self.events
            .emit(&AppEvent::SnapshotChecked(current.clone()));
        let edge = self.previous.first_rising_edge(&current);
        self.previous = current;

        // 3. First edge consumes the scan.
        match (edge, self.pending.take()) {
            (Some(gate), Some(scan)) => self.dispatch(scan.identifier, gate),
            (_, still_pending) => {
                self.pending = still_pending;
                TickOutcome::Waiting
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn pending(&self) -> Option<&PendingScan> {
        self.pending.as_ref()
    }

    /// Baseline the next tick will diff against.
    pub fn previous(&self) -> &GateSnapshot {
        &self.previous
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    // ── Internal ──────────────────────────────────────────────

    /// Query the sensors, forcing the result to the configured gate count.
    fn fetch(&mut self) -> GateSnapshot {
        self.sensors.query(self.gate_count).resized(self.gate_count)
    }

    fn dispatch(&mut self, identifier: String, gate: GateId) -> TickOutcome {
        let command = format_command(&self.macro_name, &identifier, gate);
        self.stats.matches += 1;
        self.events.emit(&AppEvent::GateMatched {
            identifier: identifier.clone(),
            gate,
            command: command.clone(),
        });

        let delivered = match self.commands.send(&command) {
            Ok(()) => true,
            Err(e) => {
                self.stats.dispatch_failures += 1;
                self.events.emit(&AppEvent::DispatchFailed {
                    command,
                    reason: e.to_string(),
                });
                false
            }
        };

        TickOutcome::Matched {
            identifier,
            gate,
            delivered,
        }
    }
}
