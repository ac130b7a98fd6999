//! Gate model — gate ids, tri-state sensor readings, and snapshots.
//!
//! A [`GateSnapshot`] holds one [`SensorReading`] per configured gate, taken
//! at a single query instant.  Edge detection between two snapshots lives
//! here too, so the correlation engine only decides *when* to compare, not
//! *how*.
//!
//! ## Edge rule
//!
//! Only a definite `Absent → Present` transition is a rising edge.  An
//! `Unknown` reading on either side never counts: a failed query must not
//! be mistaken for a freshly inserted filament.

use core::fmt;

/// Hard upper bound on configured gates (fixed-capacity snapshot storage).
pub const MAX_GATES: usize = 32;

// ---------------------------------------------------------------------------
// GateId
// ---------------------------------------------------------------------------

/// Position of a gate in the configured gate sequence (0‥N-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GateId(pub u8);

impl GateId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every gate id for a machine with `gate_count` gates, ascending.
pub fn gate_ids(gate_count: usize) -> impl Iterator<Item = GateId> {
    (0..gate_count.min(MAX_GATES)).map(|i| GateId(i as u8))
}

// ---------------------------------------------------------------------------
// SensorReading
// ---------------------------------------------------------------------------

/// Filament-presence reading for one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorReading {
    Present,
    Absent,
    /// The query failed or the gate was missing from the response.
    #[default]
    Unknown,
}

impl SensorReading {
    /// Map a `filament_detected` flag (absent flag → `Unknown`).
    pub const fn from_detected(detected: Option<bool>) -> Self {
        match detected {
            Some(true) => Self::Present,
            Some(false) => Self::Absent,
            None => Self::Unknown,
        }
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// `true` only for a definite `Absent → Present` transition.
pub const fn is_rising_edge(previous: SensorReading, current: SensorReading) -> bool {
    matches!(
        (previous, current),
        (SensorReading::Absent, SensorReading::Present)
    )
}

// ---------------------------------------------------------------------------
// GateSnapshot
// ---------------------------------------------------------------------------

/// One reading per configured gate, indexed by [`GateId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateSnapshot {
    readings: heapless::Vec<SensorReading, MAX_GATES>,
}

impl GateSnapshot {
    /// All-`Unknown` snapshot — what a failed query degrades to.
    pub fn unknown(gate_count: usize) -> Self {
        let mut readings = heapless::Vec::new();
        for _ in 0..gate_count.min(MAX_GATES) {
            let _ = readings.push(SensorReading::Unknown);
        }
        Self { readings }
    }

    /// Build from explicit readings.  Anything past [`MAX_GATES`] is dropped.
    pub fn from_readings(readings: &[SensorReading]) -> Self {
        let n = readings.len().min(MAX_GATES);
        let mut out = heapless::Vec::new();
        for reading in &readings[..n] {
            let _ = out.push(*reading);
        }
        Self { readings: out }
    }

    /// Truncate or pad with `Unknown` to exactly `gate_count` readings.
    pub fn resized(mut self, gate_count: usize) -> Self {
        let n = gate_count.min(MAX_GATES);
        self.readings.truncate(n);
        while self.readings.len() < n {
            let _ = self.readings.push(SensorReading::Unknown);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading for `gate`; gates outside the snapshot read as `Unknown`.
    pub fn get(&self, gate: GateId) -> SensorReading {
        self.readings
            .get(gate.index())
            .copied()
            .unwrap_or(SensorReading::Unknown)
    }

    /// Overwrite the reading for `gate`.  Out-of-range gates are ignored.
    pub fn set(&mut self, gate: GateId, reading: SensorReading) {
        if let Some(slot) = self.readings.get_mut(gate.index()) {
            *slot = reading;
        }
    }

    /// `(gate, reading)` pairs in ascending gate order.
    pub fn iter(&self) -> impl Iterator<Item = (GateId, SensorReading)> + '_ {
        self.readings
            .iter()
            .enumerate()
            .map(|(i, r)| (GateId(i as u8), *r))
    }

    pub fn is_all_unknown(&self) -> bool {
        self.readings.iter().all(|r| !r.is_known())
    }

    /// Lowest gate that rose from `Absent` (in `self`) to `Present` (in
    /// `current`).  Gates missing from either side read as `Unknown`.
    pub fn first_rising_edge(&self, current: &GateSnapshot) -> Option<GateId> {
        current
            .iter()
            .find(|(gate, now)| is_rising_edge(self.get(*gate), *now))
            .map(|(gate, _)| gate)
    }
}

impl fmt::Display for GateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (gate, reading) in self.iter() {
            if gate.index() > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}={}", gate, reading)?;
        }
        write!(f, "]")
    }
}

// ---------------------------------------------------------------------------
// Command formatting
// ---------------------------------------------------------------------------

/// `<MACRO> SPOOLID=<identifier> GATE=<gate>` — the G-code line sent on a match.
pub fn format_command(macro_name: &str, identifier: &str, gate: GateId) -> String {
    format!("{} SPOOLID={} GATE={}", macro_name, identifier, gate)
}
