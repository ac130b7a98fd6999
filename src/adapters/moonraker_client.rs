//! Moonraker adapters — gate sensors and G-code dispatch over HTTP.
//!
//! [`MoonrakerSensors`] implements [`GateSensorPort`] and
//! [`MoonrakerCommands`] implements [`CommandSink`].  Each owns its own
//! [`HttpTransport`], so the engine can hold them as independent
//! collaborators.
//!
//! Sensor failures never escape: an unreachable host, a non-2xx status,
//! or an undecodable body are logged and turned into an all-`Unknown`
//! snapshot.

use log::warn;

use crate::app::ports::{CommandSink, DispatchError, GateSensorPort, HttpError, HttpTransport};
use crate::config::SystemConfig;
use crate::gates::{GateSnapshot, gate_ids};
use crate::moonraker::{
    GCODE_SCRIPT_PATH, OBJECTS_QUERY_PATH, gcode_script_body, parse_query_response, query_body,
};

// ── Sensors ───────────────────────────────────────────────────

pub struct MoonrakerSensors<T> {
    transport: T,
    sensor_prefix: String,
    timeout_ms: u32,
    failures: u32,
}

impl<T: HttpTransport> MoonrakerSensors<T> {
    pub fn new(transport: T, config: &SystemConfig) -> Self {
        Self {
            transport,
            sensor_prefix: config.sensor_name_prefix.clone(),
            timeout_ms: config.query_timeout_ms,
            failures: 0,
        }
    }

    /// Queries that degraded to all-`Unknown` since startup.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn try_query(&mut self, gate_count: usize) -> Result<GateSnapshot, String> {
        let body = query_body(&self.sensor_prefix, gate_ids(gate_count))
            .map_err(|e| format!("encode: {e}"))?;
        let response = self
            .transport
            .post_json(OBJECTS_QUERY_PATH, &body, self.timeout_ms)
            .map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(HttpError::Status(response.status).to_string());
        }
        parse_query_response(&response.body, &self.sensor_prefix, gate_count)
            .map_err(|e| format!("decode: {e}"))
    }
}

impl<T: HttpTransport> GateSensorPort for MoonrakerSensors<T> {
    fn query(&mut self, gate_count: usize) -> GateSnapshot {
        match self.try_query(gate_count) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                self.failures = self.failures.saturating_add(1);
                warn!("Gate sensor query failed: {}", reason);
                GateSnapshot::unknown(gate_count)
            }
        }
    }
}

// ── Commands ──────────────────────────────────────────────────

pub struct MoonrakerCommands<T> {
    transport: T,
    timeout_ms: u32,
}

impl<T: HttpTransport> MoonrakerCommands<T> {
    pub fn new(transport: T, config: &SystemConfig) -> Self {
        Self {
            transport,
            timeout_ms: config.dispatch_timeout_ms,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: HttpTransport> CommandSink for MoonrakerCommands<T> {
    fn send(&mut self, command: &str) -> Result<(), DispatchError> {
        let body = gcode_script_body(command).map_err(|_| DispatchError::Encode)?;
        let response = self
            .transport
            .post_json(GCODE_SCRIPT_PATH, &body, self.timeout_ms)?;
        if !response.is_success() {
            return Err(HttpError::Status(response.status).into());
        }
        Ok(())
    }
}
