//! Moonraker JSON-RPC-over-HTTP payloads.
//!
//! Pure request/response handling for the two endpoints the firmware uses.
//! No I/O happens here; [`MoonrakerSensors`](crate::adapters::moonraker_client::MoonrakerSensors)
//! and [`MoonrakerCommands`](crate::adapters::moonraker_client::MoonrakerCommands)
//! move the bytes.
//!
//! | Endpoint                 | Purpose                              |
//! |--------------------------|--------------------------------------|
//! | `/printer/objects/query` | read every gate's filament sensor    |
//! | `/printer/gcode/script`  | run the load macro                   |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::gates::{GateId, GateSnapshot, SensorReading};

pub const OBJECTS_QUERY_PATH: &str = "/printer/objects/query";
pub const GCODE_SCRIPT_PATH: &str = "/printer/gcode/script";

/// Klipper object type for a filament switch sensor.
const SENSOR_OBJECT_TYPE: &str = "filament_switch_sensor";
const DETECTED_FIELD: &str = "filament_detected";

/// Klipper object name for `gate`, e.g. `filament_switch_sensor mmu_pre_gate_3`.
pub fn sensor_object_name(sensor_prefix: &str, gate: GateId) -> String {
    format!("{} {}{}", SENSOR_OBJECT_TYPE, sensor_prefix, gate)
}

/// Body for an objects query covering every configured gate.
///
/// Each object maps to `null`, which asks Moonraker for all of its fields.
pub fn query_body(
    sensor_prefix: &str,
    gates: impl Iterator<Item = GateId>,
) -> Result<String, serde_json::Error> {
    let mut objects = Map::new();
    for gate in gates {
        objects.insert(sensor_object_name(sensor_prefix, gate), Value::Null);
    }
    let mut root = Map::new();
    root.insert("objects".to_string(), Value::Object(objects));
    serde_json::to_string(&Value::Object(root))
}

/// Turn an objects-query response into a snapshot of `gate_count` gates.
///
/// Only a body that is not JSON at all is an error.  A missing `result`,
/// a missing sensor, or a non-boolean `filament_detected` each degrade the
/// affected gates to `Unknown`.
pub fn parse_query_response(
    body: &[u8],
    sensor_prefix: &str,
    gate_count: usize,
) -> Result<GateSnapshot, serde_json::Error> {
    let root: Value = serde_json::from_slice(body)?;
    let status = root.get("result").and_then(|r| r.get("status"));

    let mut snapshot = GateSnapshot::unknown(gate_count);
    let Some(status) = status else {
        return Ok(snapshot);
    };

    let gates: Vec<GateId> = snapshot.iter().map(|(gate, _)| gate).collect();
    for gate in gates {
        let detected = status
            .get(sensor_object_name(sensor_prefix, gate))
            .and_then(|sensor| sensor.get(DETECTED_FIELD))
            .and_then(Value::as_bool);
        snapshot.set(gate, SensorReading::from_detected(detected));
    }
    Ok(snapshot)
}

#[derive(Serialize)]
struct GcodeScript<'a> {
    script: &'a str,
}

/// Body for a G-code script request.
pub fn gcode_script_body(script: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&GcodeScript { script })
}
