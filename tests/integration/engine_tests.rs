//! Integration tests for the scan → baseline → edge → command pipeline.
//!
//! Time is passed explicitly in milliseconds; sensors replay scripted
//! snapshots so each tick sees exactly the readings a test chooses.

use spoolgate::app::events::AppEvent;
use spoolgate::app::ports::HttpError;
use spoolgate::app::service::{CorrelationEngine, TickOutcome};
use spoolgate::config::SystemConfig;
use spoolgate::gates::{GateId, GateSnapshot};

use crate::mock_hw::{LogSink, RecordingCommands, ScriptedSensors, snap};

type Engine = CorrelationEngine<ScriptedSensors, RecordingCommands, LogSink>;

fn config(gates: u8, timeout_secs: u32) -> SystemConfig {
    SystemConfig {
        gate_count: gates,
        pending_timeout_secs: timeout_secs,
        ..SystemConfig::default()
    }
}

fn make_engine(gates: u8, timeout_secs: u32, script: &[GateSnapshot]) -> Engine {
    CorrelationEngine::new(
        &config(gates, timeout_secs),
        ScriptedSensors::new(script),
        RecordingCommands::new(),
        LogSink::new(),
    )
}

// ── End-to-end walkthroughs ───────────────────────────────────

#[test]
fn scan_then_load_dispatches_command_for_that_gate() {
    // scan baseline, then gate 1 gets filament
    let mut engine = make_engine(3, 20, &[snap("___"), snap("_P_")]);

    assert!(engine.on_scan_line("SET_SPOOL_ID ID=AB12", 0));
    assert_eq!(engine.previous(), &snap("___"));

    let outcome = engine.on_tick(2_000);
    assert_eq!(
        outcome,
        TickOutcome::Matched {
            identifier: "AB12".into(),
            gate: GateId(1),
            delivered: true,
        }
    );
    assert_eq!(
        engine.commands().sent,
        vec!["LOAD_SPOOL_AT_GATE SPOOLID=AB12 GATE=1".to_string()]
    );
    assert!(engine.pending().is_none());
}

#[test]
fn stale_scan_expires_without_command() {
    let mut engine = make_engine(3, 5, &[snap("___"), snap("PPP")]);
    engine.on_scan_line("SET_SPOOL_ID ID=XY9", 0);

    let queries_before = engine.sensors_mut().queries;
    let outcome = engine.on_tick(6_000);

    assert_eq!(
        outcome,
        TickOutcome::Expired {
            identifier: "XY9".into()
        }
    );
    assert!(engine.commands().sent.is_empty());
    assert!(engine.pending().is_none());
    // Expiry is decided before the sensors are consulted.
    assert_eq!(engine.sensors_mut().queries, queries_before);
}

// ── Timing ────────────────────────────────────────────────────

#[test]
fn expiry_wins_over_an_edge_on_the_same_tick() {
    let mut engine = make_engine(2, 5, &[snap("__"), snap("P_")]);
    engine.on_scan_line("SET_SPOOL_ID ID=late", 0);

    let outcome = engine.on_tick(5_000);

    assert!(matches!(outcome, TickOutcome::Expired { .. }));
    assert!(engine.commands().sent.is_empty());
}

#[test]
fn scan_is_still_live_just_before_the_deadline() {
    let mut engine = make_engine(2, 5, &[snap("__"), snap("_P")]);
    engine.on_scan_line("SET_SPOOL_ID ID=edge", 0);

    let outcome = engine.on_tick(4_999);

    assert!(matches!(
        outcome,
        TickOutcome::Matched {
            gate: GateId(1),
            ..
        }
    ));
}

// ── Edge selection ────────────────────────────────────────────

#[test]
fn lowest_gate_wins_when_several_rise_together() {
    let mut engine = make_engine(6, 20, &[snap("______"), snap("___P_P")]);
    engine.on_scan_line("SET_SPOOL_ID ID=tie", 0);

    engine.on_tick(1_000);

    assert_eq!(
        engine.commands().sent,
        vec!["LOAD_SPOOL_AT_GATE SPOOLID=tie GATE=3".to_string()]
    );
}

#[test]
fn gate_already_loaded_at_scan_time_does_not_match() {
    // Gate 0 was loaded before the scan; only gate 2 is a fresh load.
    let mut engine = make_engine(3, 20, &[snap("P__"), snap("P__"), snap("P_P")]);
    engine.on_scan_line("SET_SPOOL_ID ID=fresh", 0);

    assert_eq!(engine.on_tick(1_000), TickOutcome::Waiting);
    let outcome = engine.on_tick(2_000);

    assert!(matches!(
        outcome,
        TickOutcome::Matched {
            gate: GateId(2),
            ..
        }
    ));
}

#[test]
fn unknown_baseline_never_produces_a_match() {
    // Baseline unavailable at scan time: a present gate is not an edge.
    let mut engine = make_engine(2, 20, &[snap("??"), snap("P_"), snap("P_")]);
    engine.on_scan_line("SET_SPOOL_ID ID=blind", 0);

    assert_eq!(engine.on_tick(1_000), TickOutcome::Waiting);
    assert_eq!(engine.on_tick(2_000), TickOutcome::Waiting);
    assert!(engine.commands().sent.is_empty());
}

#[test]
fn sensor_outage_needs_two_good_reads_before_an_edge() {
    // good → outage → absent → present
    let mut engine = make_engine(
        2,
        20,
        &[snap("__"), snap("??"), snap("__"), snap("_P")],
    );
    engine.on_scan_line("SET_SPOOL_ID ID=flaky", 0);

    assert_eq!(engine.on_tick(1_000), TickOutcome::Waiting);
    assert!(engine.previous().is_all_unknown());
    assert_eq!(engine.on_tick(2_000), TickOutcome::Waiting);
    assert!(matches!(
        engine.on_tick(3_000),
        TickOutcome::Matched {
            gate: GateId(1),
            ..
        }
    ));
}

#[test]
fn waiting_tick_carries_the_snapshot_forward() {
    // Gate 1 goes dark for a tick, then gate 1 and 2 both read present.
    let mut engine = make_engine(3, 20, &[snap("___"), snap("_?_"), snap("_PP")]);
    engine.on_scan_line("SET_SPOOL_ID ID=carry", 0);

    assert_eq!(engine.on_tick(1_000), TickOutcome::Waiting);
    assert_eq!(engine.previous(), &snap("_?_"));

    // Gate 1 rises from Unknown, which is not an edge; gate 2 is.
    assert!(matches!(
        engine.on_tick(2_000),
        TickOutcome::Matched {
            gate: GateId(2),
            ..
        }
    ));
    assert_eq!(engine.previous(), &snap("_PP"));
}

#[test]
fn loaded_gate_that_blinks_unknown_is_not_reloaded() {
    // Gate 0 is loaded at scan time, drops out for one query, then reads
    // present again.  None of that is a fresh load.
    let mut engine = make_engine(2, 20, &[snap("P_"), snap("?_"), snap("P_")]);
    engine.on_scan_line("SET_SPOOL_ID ID=blink", 0);

    assert_eq!(engine.on_tick(1_000), TickOutcome::Waiting);
    assert_eq!(engine.on_tick(2_000), TickOutcome::Waiting);
    assert!(engine.commands().sent.is_empty());
    assert!(engine.pending().is_some());
}

#[test]
fn repeated_snapshot_is_not_an_edge() {
    let mut engine = make_engine(2, 20, &[snap("_P")]);
    engine.on_scan_line("SET_SPOOL_ID ID=steady", 0);

    for t in 1..=3 {
        assert_eq!(engine.on_tick(t * 1_000), TickOutcome::Waiting);
        assert_eq!(engine.previous(), &snap("_P"));
    }
    assert!(engine.commands().sent.is_empty());
}

// ── Pending-scan replacement ──────────────────────────────────

#[test]
fn newer_scan_replaces_older_one() {
    let mut engine = make_engine(2, 20, &[snap("__"), snap("__"), snap("P_")]);
    engine.on_scan_line("SET_SPOOL_ID ID=A", 0);
    engine.on_scan_line("SET_SPOOL_ID ID=B", 500);

    engine.on_tick(1_000);

    assert_eq!(
        engine.commands().sent,
        vec!["LOAD_SPOOL_AT_GATE SPOOLID=B GATE=0".to_string()]
    );
    assert_eq!(
        engine.events().count(|e| matches!(
            e,
            AppEvent::ScanReplaced { discarded } if discarded == "A"
        )),
        1
    );
    assert_eq!(engine.stats().replaced, 1);
}

#[test]
fn replacement_restarts_the_timeout() {
    let mut engine = make_engine(2, 5, &[snap("__")]);
    engine.on_scan_line("SET_SPOOL_ID ID=A", 0);
    engine.on_scan_line("SET_SPOOL_ID ID=B", 4_000);

    // 6 s after A but only 2 s after B.
    assert_eq!(engine.on_tick(6_000), TickOutcome::Waiting);
    assert_eq!(engine.pending().map(|p| p.identifier.as_str()), Some("B"));
}

// ── One command per scan ──────────────────────────────────────

#[test]
fn scan_is_consumed_by_its_first_match() {
    let mut engine = make_engine(3, 20, &[snap("___"), snap("P__"), snap("PP_")]);
    engine.on_scan_line("SET_SPOOL_ID ID=once", 0);

    engine.on_tick(1_000);
    assert_eq!(engine.on_tick(2_000), TickOutcome::Idle);

    assert_eq!(engine.commands().sent.len(), 1);
}

#[test]
fn failed_dispatch_still_consumes_the_scan() {
    let mut engine = CorrelationEngine::new(
        &config(2, 20),
        ScriptedSensors::new(&[snap("__"), snap("_P")]),
        RecordingCommands::failing(HttpError::Status(500)),
        LogSink::new(),
    );
    engine.on_scan_line("SET_SPOOL_ID ID=lost", 0);

    let outcome = engine.on_tick(1_000);

    assert_eq!(
        outcome,
        TickOutcome::Matched {
            identifier: "lost".into(),
            gate: GateId(1),
            delivered: false,
        }
    );
    assert!(engine.pending().is_none());
    assert_eq!(engine.commands().sent.len(), 1);
    assert_eq!(engine.stats().dispatch_failures, 1);
    assert_eq!(
        engine
            .events()
            .count(|e| matches!(e, AppEvent::DispatchFailed { .. })),
        1
    );
}

// ── Idle and noise ────────────────────────────────────────────

#[test]
fn idle_tick_does_not_touch_sensors() {
    let mut engine = make_engine(2, 20, &[snap("__")]);
    engine.start();
    let after_start = engine.sensors_mut().queries;

    assert_eq!(engine.on_tick(1_000), TickOutcome::Idle);
    assert_eq!(engine.on_tick(2_000), TickOutcome::Idle);
    assert_eq!(engine.sensors_mut().queries, after_start);
}

#[test]
fn noise_lines_are_ignored_and_reported() {
    let mut engine = make_engine(2, 20, &[snap("__")]);

    assert!(!engine.on_scan_line("PN532 ready", 0));
    assert!(!engine.on_scan_line("SET_SPOOL_ID 42", 0));

    assert!(engine.pending().is_none());
    assert_eq!(
        engine
            .events()
            .count(|e| matches!(e, AppEvent::LineIgnored(_))),
        2
    );
}

#[test]
fn start_emits_baseline_with_configured_gate_count() {
    let mut engine = make_engine(4, 20, &[snap("P_")]);
    engine.start();

    // Short sensor reply is padded to the configured gate count.
    assert_eq!(engine.previous(), &snap("P_??"));
    assert!(matches!(
        engine.events().events.first(),
        Some(AppEvent::Started { gates: 4, .. })
    ));
}
