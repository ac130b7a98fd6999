//! System configuration parameters
//!
//! All tunable parameters for the spool-gate bridge.  Read once at startup
//! and never mutated afterwards.  Defaults can be overridden at build time
//! through environment variables (see [`SystemConfig::from_build_env`]).

use serde::{Deserialize, Serialize};

use crate::gates::MAX_GATES;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- NFC reader (UART) ---
    /// Reader baud rate
    pub serial_baud: u32,
    /// Longest wait for one reader line before the loop moves on (milliseconds)
    pub serial_read_timeout_ms: u32,

    // --- Moonraker ---
    /// Base URL of the Moonraker API, without trailing slash
    pub moonraker_base_url: String,
    /// Objects-query request timeout (milliseconds)
    pub query_timeout_ms: u32,
    /// G-code script request timeout (milliseconds)
    pub dispatch_timeout_ms: u32,

    // --- Gates ---
    /// Number of MMU gates (sensor i is `<sensor_name_prefix><i>`)
    pub gate_count: u8,
    /// Filament switch sensor name prefix
    pub sensor_name_prefix: String,
    /// Macro invoked as `<macro> SPOOLID=<id> GATE=<gate>`
    pub macro_name: String,

    // --- Timing ---
    /// How long a scanned spool waits for a gate (seconds)
    pub pending_timeout_secs: u32,
    /// Minimum delay between sensor checks while a scan is pending (milliseconds)
    pub tick_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Reader
            serial_baud: 115_200,
            serial_read_timeout_ms: 1000,

            // Moonraker
            moonraker_base_url: "http://localhost:7125".to_string(),
            query_timeout_ms: 2000,
            dispatch_timeout_ms: 3000,

            // Gates
            gate_count: 14,
            sensor_name_prefix: "mmu_pre_gate_".to_string(),
            macro_name: "LOAD_SPOOL_AT_GATE".to_string(),

            // Timing
            pending_timeout_secs: 20,
            tick_interval_ms: 1000,
        }
    }
}

impl SystemConfig {
    /// Defaults, overridden by any of `MOONRAKER_URL`, `SPOOLGATE_GATES`,
    /// `SPOOLGATE_MACRO`, `SPOOLGATE_TIMEOUT_SECS` set when the firmware was
    /// built.  Unparseable numbers fall back to the default.
    pub fn from_build_env() -> Self {
        Self::with_overrides(
            option_env!("MOONRAKER_URL"),
            option_env!("SPOOLGATE_GATES"),
            option_env!("SPOOLGATE_MACRO"),
            option_env!("SPOOLGATE_TIMEOUT_SECS"),
        )
    }

    fn with_overrides(
        url: Option<&str>,
        gates: Option<&str>,
        macro_name: Option<&str>,
        timeout_secs: Option<&str>,
    ) -> Self {
        let mut c = Self::default();
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            c.moonraker_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(n) = gates.and_then(|v| v.trim().parse::<u8>().ok()) {
            c.gate_count = n;
        }
        if let Some(name) = macro_name.filter(|m| !m.is_empty()) {
            c.macro_name = name.to_string();
        }
        if let Some(secs) = timeout_secs.and_then(|v| v.trim().parse::<u32>().ok()) {
            c.pending_timeout_secs = secs;
        }
        c
    }

    /// Range-check every field.  The error names the offending field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.gate_count == 0 || self.gate_count as usize > MAX_GATES {
            return Err("gate_count must be 1..=32");
        }
        if self.macro_name.is_empty() || self.macro_name.chars().any(char::is_whitespace) {
            return Err("macro_name must be a single non-empty word");
        }
        if self.sensor_name_prefix.is_empty() {
            return Err("sensor_name_prefix must not be empty");
        }
        // The HTTP transport carries no certificate bundle.
        if !self.moonraker_base_url.starts_with("http://") {
            return Err("moonraker_base_url must start with http://");
        }
        if self.pending_timeout_secs == 0 {
            return Err("pending_timeout_secs must be > 0");
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be > 0");
        }
        if self.serial_baud == 0 {
            return Err("serial_baud must be > 0");
        }
        if self.query_timeout_ms == 0 || self.dispatch_timeout_ms == 0 {
            return Err("HTTP timeouts must be > 0");
        }
        Ok(())
    }

    /// Pending-scan lifetime in milliseconds.
    pub fn pending_timeout_ms(&self) -> u64 {
        self.pending_timeout_secs as u64 * 1000
    }

    /// `gate_count` as a collection length.
    pub fn gates(&self) -> usize {
        self.gate_count as usize
    }
}
