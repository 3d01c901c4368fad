//! Integration tests for the NodeService → engine → pump pipeline.
//!
//! Sample cycles run against [`MockHardware`]; backend replies come from
//! [`MockUplink`].  Time is passed explicitly, so every scenario is
//! deterministic.

use crate::mock_hw::{MockHardware, MockUplink, RecordingSink};

use agromind::app::events::{AppEvent, PumpCause, SuppressReason};
use agromind::app::service::{NodeService, SyncOutcome};
use agromind::config::NodeConfig;
use agromind::error::UplinkError;
use agromind::fsm::rules::{RuleId, Verdict};
use agromind::fsm::{EndReason, StateId};

const SEC: u64 = 1_000;

fn make_node() -> (NodeService, MockHardware, RecordingSink) {
    let mut app = NodeService::new(&NodeConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

/// Node with auto mode on, threshold 30 %, 10 s sessions.
fn auto_node() -> (NodeService, MockHardware, RecordingSink, MockUplink) {
    let (mut app, mut hw, mut sink) = make_node();
    let mut uplink = MockUplink::new();
    uplink.reply_json(
        r#"{"commands":{"autoMode":true,"moistureThreshold":30,"wateringDuration":10}}"#,
    );
    app.sync(&mut uplink, &mut hw, 0, &mut sink);
    assert!(app.engine().config().auto_mode_enabled);
    sink.clear();
    (app, hw, sink, uplink)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_forces_pump_off_and_announces_idle() {
    let (app, hw, sink) = make_node();
    assert_eq!(hw.pump_writes, vec![false]);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(sink.events, vec![AppEvent::Started(StateId::Idle)]);
}

#[test]
fn auto_mode_is_off_until_the_backend_enables_it() {
    let (mut app, mut hw, mut sink) = make_node();
    hw.set_soil_pct(10.0);
    let d = app.tick(&mut hw, 0, &mut sink);
    assert_eq!(d.rule, RuleId::AutoModeDisabled);
    assert!(!hw.pump_on);
}

// ── Scenario A: session ends on the deadline ──────────────────

#[test]
fn dry_soil_waters_until_deadline() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(25.0);
    hw.set_tank_pct(50.0);

    app.tick(&mut hw, 0, &mut sink);
    assert!(hw.pump_on);
    assert_eq!(app.state(), StateId::AutoWatering);
    assert_eq!(app.engine().session().map(|s| s.deadline_ms), Some(10 * SEC));

    app.tick(&mut hw, 5 * SEC, &mut sink);
    assert!(hw.pump_on, "still within the session");

    let d = app.tick(&mut hw, 11 * SEC, &mut sink);
    assert_eq!(d.verdict, Verdict::PumpOff(EndReason::Timeout));
    assert!(!hw.pump_on);
    assert_eq!(app.state(), StateId::Idle);
    assert!(sink.events.contains(&AppEvent::SessionEnded {
        reason: EndReason::Timeout,
        started_at_ms: 0,
    }));
}

// ── Scenario B: session ends on recovery ──────────────────────

#[test]
fn wet_soil_ends_session_early() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(25.0);
    app.tick(&mut hw, 0, &mut sink);
    assert!(hw.pump_on);

    hw.set_soil_pct(36.0);
    let d = app.tick(&mut hw, 3 * SEC, &mut sink);
    assert_eq!(d.verdict, Verdict::PumpOff(EndReason::Recovered));
    assert!(!hw.pump_on);
    assert!(app.engine().session().is_none());
}

#[test]
fn hysteresis_band_neither_restarts_nor_stops() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(25.0);
    app.tick(&mut hw, 0, &mut sink);
    let deadline = app.engine().session().map(|s| s.deadline_ms);

    // Above threshold but below threshold + margin.
    hw.set_soil_pct(33.0);
    for t in 1..=9 {
        let d = app.tick(&mut hw, t * SEC, &mut sink);
        assert_eq!(d.rule, RuleId::SessionActive);
        assert_eq!(d.verdict, Verdict::Hold);
    }
    assert!(hw.pump_on);
    assert_eq!(app.engine().session().map(|s| s.deadline_ms), deadline);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SessionStarted { .. })), 1);
}

// ── Deadline polling between sample cycles ────────────────────

#[test]
fn poll_honours_deadline_without_sampling() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(25.0);
    app.tick(&mut hw, 0, &mut sink);

    // Sensors are not read again; only cached readings are evaluated.
    hw.fail_soil();
    app.poll(&mut hw, 9_900, &mut sink);
    assert!(hw.pump_on);
    app.poll(&mut hw, 10_000, &mut sink);
    assert!(!hw.pump_on);
    assert_eq!(app.cycles(), 1);
}

// ── Safety ────────────────────────────────────────────────────

#[test]
fn low_tank_stops_session() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(25.0);
    app.tick(&mut hw, 0, &mut sink);
    assert!(hw.pump_on);

    hw.set_tank_pct(3.0);
    let d = app.tick(&mut hw, SEC, &mut sink);
    assert_eq!(d.verdict, Verdict::PumpOff(EndReason::TankLow));
    assert!(!hw.pump_on);
    assert!(sink.events.contains(&AppEvent::PumpChanged {
        on: false,
        cause: PumpCause::Stopped(EndReason::TankLow),
    }));
}

#[test]
fn low_tank_never_starts_session() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(5.0);
    hw.set_tank_pct(4.0);
    for t in 0..5 {
        app.tick(&mut hw, t * SEC, &mut sink);
    }
    assert!(!hw.pump_on);
    assert_eq!(app.state(), StateId::Idle);
}

#[test]
fn missing_echo_reads_as_empty_tank() {
    let (mut app, mut hw, mut sink, _uplink) = auto_node();
    hw.set_soil_pct(25.0);
    app.tick(&mut hw, 0, &mut sink);
    assert!(hw.pump_on);

    hw.fail_echo();
    app.tick(&mut hw, SEC, &mut sink);
    assert!(!hw.pump_on, "no echo must fail safe");
    assert_eq!(app.readings().tank_level_pct, 0.0);
    assert!(
        sink.count(|e| matches!(e, AppEvent::SensorFault { .. })) >= 1,
        "the missing echo is reported"
    );
}

#[test]
fn failed_soil_read_keeps_previous_value() {
    let (mut app, mut hw, mut sink) = make_node();
    hw.set_soil_pct(42.0);
    app.tick(&mut hw, 0, &mut sink);

    hw.fail_soil();
    app.tick(&mut hw, 10 * SEC, &mut sink);
    assert!((app.readings().soil_moisture_pct - 42.0).abs() < 0.01);
    assert_eq!(app.readings().sampled_at_ms, Some(10 * SEC));
}

// ── Reporting ─────────────────────────────────────────────────

#[test]
fn report_carries_cached_readings() {
    let (mut app, mut hw, mut sink) = make_node();
    hw.set_soil_pct(40.0);
    app.tick(&mut hw, 0, &mut sink);

    let mut uplink = MockUplink::new();
    let outcome = app.sync(&mut uplink, &mut hw, 0, &mut sink);
    assert!(matches!(outcome, SyncOutcome::Exchanged(_)));
    assert_eq!(uplink.sent.len(), 1);

    let r = &uplink.sent[0];
    assert_eq!(r.zone_id, 1);
    assert!((r.sensors.soil_moisture - 40.0).abs() < 0.01);
    assert!((r.sensors.temperature - 22.0).abs() < f32::EPSILON);
    assert!((r.sensors.water_level - 50.0).abs() < 0.5);
    assert!(!r.sensors.pump_status);
}

#[test]
fn report_suppressed_while_disconnected() {
    let (mut app, mut hw, mut sink) = make_node();
    let mut uplink = MockUplink::new();
    uplink.connected = false;
    uplink.reply_json(r#"{"pumpCommand":true}"#);

    let outcome = app.sync(&mut uplink, &mut hw, 0, &mut sink);
    assert_eq!(outcome, SyncOutcome::Suppressed(SuppressReason::NotConnected));
    assert!(uplink.sent.is_empty());
    assert!(!hw.pump_on, "queued reply never consumed");
}

#[test]
fn report_suppressed_without_zone_identity() {
    let config = NodeConfig {
        zone_id: None,
        ..NodeConfig::default()
    };
    let mut app = NodeService::new(&config);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut uplink = MockUplink::new();

    let outcome = app.sync(&mut uplink, &mut hw, 0, &mut sink);
    assert_eq!(outcome, SyncOutcome::Suppressed(SuppressReason::NoZoneIdentity));
    assert!(sink
        .events
        .contains(&AppEvent::ReportSuppressed(SuppressReason::NoZoneIdentity)));

    app.set_zone_id(Some(9));
    app.sync(&mut uplink, &mut hw, 0, &mut sink);
    assert_eq!(uplink.sent[0].zone_id, 9);
}

#[test]
fn uplink_failure_leaves_control_running() {
    let (mut app, mut hw, mut sink, mut uplink) = auto_node();
    hw.set_soil_pct(25.0);
    app.tick(&mut hw, 0, &mut sink);

    uplink.fail_next(UplinkError::Status(503));
    let outcome = app.sync(&mut uplink, &mut hw, 0, &mut sink);
    assert_eq!(outcome, SyncOutcome::Failed);
    assert!(sink
        .events
        .contains(&AppEvent::UplinkFailed(UplinkError::Status(503))));
    assert!(hw.pump_on, "session unaffected by the failed exchange");

    app.tick(&mut hw, 11 * SEC, &mut sink);
    assert!(!hw.pump_on);
}
