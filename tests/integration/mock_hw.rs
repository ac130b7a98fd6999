//! Mock printer-host and reader adapters for integration tests.
//!
//! Records every command and event so tests can assert on the full
//! history without a UART or a Moonraker instance.

use std::collections::VecDeque;

use spoolgate::app::events::AppEvent;
use spoolgate::app::ports::{
    CommandSink, DispatchError, EventSink, GateSensorPort, HttpError, HttpResponse, HttpTransport,
    TimePort,
};
use spoolgate::gates::{GateSnapshot, SensorReading};

/// Shorthand: `snap("A_P?")` → `[Absent, Absent, Present, Unknown]`.
pub fn snap(pattern: &str) -> GateSnapshot {
    let readings: Vec<SensorReading> = pattern
        .chars()
        .map(|c| match c {
            'P' => SensorReading::Present,
            '_' => SensorReading::Absent,
            _ => SensorReading::Unknown,
        })
        .collect();
    GateSnapshot::from_readings(&readings)
}

// ── ScriptedSensors ───────────────────────────────────────────

/// Replays queued snapshots; once drained, repeats the last one.
pub struct ScriptedSensors {
    script: VecDeque<GateSnapshot>,
    last: Option<GateSnapshot>,
    pub queries: u32,
}

#[allow(dead_code)]
impl ScriptedSensors {
    pub fn new(snapshots: &[GateSnapshot]) -> Self {
        Self {
            script: snapshots.iter().cloned().collect(),
            last: None,
            queries: 0,
        }
    }

    pub fn push(&mut self, snapshot: GateSnapshot) {
        self.script.push_back(snapshot);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl GateSensorPort for ScriptedSensors {
    fn query(&mut self, gate_count: usize) -> GateSnapshot {
        self.queries += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = Some(next);
        }
        self.last
            .clone()
            .unwrap_or_else(|| GateSnapshot::unknown(gate_count))
    }
}

// ── RecordingCommands ─────────────────────────────────────────

/// Records every command; fails each send while `fail_with` is set.
#[derive(Default)]
pub struct RecordingCommands {
    pub sent: Vec<String>,
    pub fail_with: Option<HttpError>,
}

#[allow(dead_code)]
impl RecordingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: HttpError) -> Self {
        Self {
            sent: Vec::new(),
            fail_with: Some(err),
        }
    }
}

impl CommandSink for RecordingCommands {
    fn send(&mut self, command: &str) -> Result<(), DispatchError> {
        self.sent.push(command.to_string());
        match &self.fail_with {
            Some(err) => Err(DispatchError::Http(err.clone())),
            None => Ok(()),
        }
    }
}

// ── LogSink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Clock that only moves when told to; `delay_ms` advances it.
#[derive(Default)]
pub struct ManualClock {
    pub now: u64,
    pub delays: Vec<u32>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(now: u64) -> Self {
        Self {
            now,
            delays: Vec::new(),
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl TimePort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now += ms as u64;
    }
}

// ── FakeMoonraker ─────────────────────────────────────────────

/// HTTP transport that answers from queued replies and records requests.
#[derive(Default)]
pub struct FakeMoonraker {
    replies: VecDeque<Result<HttpResponse, HttpError>>,
    pub requests: Vec<(String, String)>,
}

#[allow(dead_code)]
impl FakeMoonraker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_json(&mut self, status: u16, body: &str) {
        self.replies.push_back(Ok(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn reply_err(&mut self, err: HttpError) {
        self.replies.push_back(Err(err));
    }
}

impl HttpTransport for FakeMoonraker {
    fn post_json(
        &mut self,
        path: &str,
        body: &str,
        _timeout_ms: u32,
    ) -> Result<HttpResponse, HttpError> {
        self.requests.push((path.to_string(), body.to_string()));
        self.replies.pop_front().unwrap_or(Err(HttpError::Connect))
    }
}
