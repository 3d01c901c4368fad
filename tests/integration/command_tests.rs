//! Integration tests for backend commands flowing through `sync`.
//!
//! Every reply is given as the JSON body the backend would send, so the
//! parser, the reconciler and the engine are exercised together.

use crate::mock_hw::{MockHardware, MockUplink, RecordingSink};

use agromind::app::events::{AppEvent, ConfigChange, PumpCause};
use agromind::app::service::{NodeService, SyncOutcome};
use agromind::config::NodeConfig;
use agromind::error::UplinkError;
use agromind::fsm::rules::RuleId;
use agromind::fsm::{EndReason, StateId};

struct Node {
    app: NodeService,
    hw: MockHardware,
    sink: RecordingSink,
    uplink: MockUplink,
}

impl Node {
    /// Started node that has taken one sample: soil `soil_pct`, tank 50 %.
    fn new(soil_pct: f32) -> Self {
        let mut node = Self {
            app: NodeService::new(&NodeConfig::default()),
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
            uplink: MockUplink::new(),
        };
        node.hw.set_soil_pct(soil_pct);
        node.app.start(&mut node.hw, &mut node.sink);
        node.app.tick(&mut node.hw, 0, &mut node.sink);
        node
    }

    fn reply(&mut self, body: &str, now_ms: u64) -> SyncOutcome {
        self.uplink.reply_json(body);
        self.app
            .sync(&mut self.uplink, &mut self.hw, now_ms, &mut self.sink)
    }

    fn watering(&self) -> bool {
        self.app.state() == StateId::AutoWatering
    }
}

// ── Auto mode ─────────────────────────────────────────────────

#[test]
fn enabling_auto_mode_with_dry_soil_starts_at_once() {
    let mut n = Node::new(20.0);
    n.reply(r#"{"commands":{"autoMode":true}}"#, 1_000);
    assert!(n.hw.pump_on);
    assert!(n.watering());
    assert!(n
        .sink
        .events
        .contains(&AppEvent::ConfigChanged(ConfigChange::AutoMode(true))));
}

#[test]
fn disabling_auto_mode_forces_pump_off() {
    let mut n = Node::new(20.0);
    n.reply(r#"{"commands":{"autoMode":true}}"#, 0);
    assert!(n.hw.pump_on);

    n.reply(r#"{"commands":{"autoMode":false}}"#, 2_000);
    assert!(!n.hw.pump_on);
    assert!(!n.watering());
    assert!(n.sink.events.contains(&AppEvent::PumpChanged {
        on: false,
        cause: PumpCause::Stopped(EndReason::AutoModeDisabled),
    }));
}

// ── Threshold / duration ──────────────────────────────────────

#[test]
fn raised_threshold_takes_effect_in_the_same_exchange() {
    let mut n = Node::new(40.0);
    n.reply(r#"{"commands":{"autoMode":true}}"#, 0);
    assert!(!n.hw.pump_on, "40 % is above the default 30 % threshold");

    n.reply(r#"{"commands":{"moistureThreshold":45}}"#, 1_000);
    assert!(n.hw.pump_on);
    assert!((n.app.engine().config().moisture_threshold_pct - 45.0).abs() < f32::EPSILON);
}

#[test]
fn invalid_values_are_ignored_or_floored() {
    let mut n = Node::new(50.0);
    n.reply(
        r#"{"commands":{"moistureThreshold":-5,"wateringDuration":0.2}}"#,
        0,
    );
    let config = n.app.engine().config();
    assert!((config.moisture_threshold_pct - 30.0).abs() < f32::EPSILON);
    assert_eq!(config.watering_duration_secs, 1);
}

#[test]
fn wrongly_typed_fields_are_treated_as_absent() {
    let mut n = Node::new(50.0);
    let outcome = n.reply(
        r#"{"commands":{"autoMode":"yes","moistureThreshold":"40","tankLocked":1}}"#,
        0,
    );
    assert!(matches!(outcome, SyncOutcome::Exchanged(_)));
    let config = n.app.engine().config();
    assert!(!config.auto_mode_enabled);
    assert!((config.moisture_threshold_pct - 30.0).abs() < f32::EPSILON);
    assert!(!config.tank_locked);
}

#[test]
fn new_duration_applies_to_the_next_session() {
    let mut n = Node::new(20.0);
    n.reply(r#"{"commands":{"autoMode":true,"wateringDuration":60}}"#, 0);
    assert_eq!(n.app.engine().session().map(|s| s.deadline_ms), Some(60_000));
}

// ── Manual override ───────────────────────────────────────────

#[test]
fn manual_on_holds_while_soil_is_wet() {
    let mut n = Node::new(60.0);
    n.reply(r#"{"commands":{"autoMode":true,"pumpState":true}}"#, 0);
    assert!(n.hw.pump_on);
    assert!(!n.watering(), "manual run is not a session");

    let d = n.app.tick(&mut n.hw, 10_000, &mut n.sink);
    assert_eq!(d.rule, RuleId::ManualHold);
    assert!(n.hw.pump_on);
}

#[test]
fn manual_off_ends_session_then_dry_soil_restarts_it() {
    let mut n = Node::new(20.0);
    n.reply(r#"{"commands":{"autoMode":true}}"#, 0);
    assert_eq!(n.app.engine().session().map(|s| s.started_at_ms), Some(0));

    n.reply(r#"{"commands":{"pumpState":false}}"#, 4_000);
    assert!(n.sink.events.contains(&AppEvent::SessionEnded {
        reason: EndReason::ManualOverride,
        started_at_ms: 0,
    }));
    assert!(n.sink.events.contains(&AppEvent::ManualOverride { on: false }));

    // No cooldown: the closing evaluation starts a fresh session.
    assert!(n.hw.pump_on);
    assert_eq!(n.app.engine().session().map(|s| s.started_at_ms), Some(4_000));
}

#[test]
fn null_pump_state_leaves_control_to_the_engine() {
    let mut n = Node::new(20.0);
    n.reply(r#"{"commands":{"autoMode":true}}"#, 0);
    n.reply(r#"{"commands":{"pumpState":null}}"#, 1_000);
    assert!(n.hw.pump_on);
    assert_eq!(n.app.engine().session().map(|s| s.started_at_ms), Some(0));
    assert_eq!(n.sink.count(|e| matches!(e, AppEvent::ManualOverride { .. })), 0);
}

#[test]
fn legacy_pump_command_is_honoured() {
    let mut n = Node::new(60.0);
    n.reply(r#"{"pumpCommand":true}"#, 0);
    assert!(n.hw.pump_on);
    assert!(n.sink.events.contains(&AppEvent::PumpChanged {
        on: true,
        cause: PumpCause::Legacy,
    }));
}

// ── Tank lock ─────────────────────────────────────────────────

#[test]
fn tank_lock_preempts_manual_on_in_the_same_message() {
    let mut n = Node::new(60.0);
    n.reply(r#"{"commands":{"tankLocked":true,"pumpState":true}}"#, 0);
    assert!(!n.hw.pump_on);
    assert!(n
        .sink
        .events
        .contains(&AppEvent::ManualRejected { requested_on: true }));
}

#[test]
fn tank_lock_stops_a_running_session() {
    let mut n = Node::new(20.0);
    n.reply(r#"{"commands":{"autoMode":true}}"#, 0);
    assert!(n.hw.pump_on);

    n.reply(r#"{"commands":{"tankLocked":true}}"#, 1_000);
    assert!(!n.hw.pump_on);
    assert!(!n.watering());
    assert!(n.sink.events.contains(&AppEvent::TankLockEnforced));

    // Stays off on later cycles while locked.
    n.app.tick(&mut n.hw, 20_000, &mut n.sink);
    assert!(!n.hw.pump_on);

    n.reply(r#"{"commands":{"tankLocked":false}}"#, 21_000);
    assert!(n.hw.pump_on, "unlocking with dry soil resumes watering");
}

#[test]
fn legacy_on_is_rejected_while_locked() {
    let mut n = Node::new(60.0);
    n.reply(r#"{"commands":{"tankLocked":true}}"#, 0);
    n.reply(r#"{"pumpCommand":true}"#, 1_000);
    assert!(!n.hw.pump_on);
    assert!(n
        .sink
        .events
        .contains(&AppEvent::ManualRejected { requested_on: true }));
}

// ── Malformed replies ─────────────────────────────────────────

#[test]
fn non_object_reply_changes_nothing() {
    let mut n = Node::new(20.0);
    let outcome = n.reply("[true]", 0);
    assert_eq!(outcome, SyncOutcome::Failed);
    assert!(n
        .sink
        .events
        .contains(&AppEvent::UplinkFailed(UplinkError::Malformed)));
    assert!(!n.app.engine().config().auto_mode_enabled);
}
