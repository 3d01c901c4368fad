//! Command reconciler.
//!
//! Merges one [`InboundMessage`] into the engine's zone configuration.
//! The order of the steps is part of the contract:
//!
//! 1. `autoMode`: switching it off ends a running session, pump off.
//! 2. `moistureThreshold`, `wateringDuration`: configuration only.
//! 3. `tankLocked`: while locked the pump is forced off and any session
//!    cancelled.  A lock pre-empts the manual command of step 4.
//! 4. `pumpState`: a manual command ends any session and is applied if it
//!    differs from the current pump state.  `null` hands control back to
//!    the engine; it does not mean "off".
//! 5. One engine evaluation, so new settings act immediately.
//!
//! A message whose `commands` is absent or empty may carry the legacy
//! `pumpCommand`, which skips steps 1–3 but still respects an active tank
//! lock.

use log::{debug, info, warn};

use crate::fsm::rules::Decision;
use crate::fsm::{EndReason, IrrigationEngine};

use super::commands::{InboundMessage, ZoneCommands};
use super::events::{AppEvent, ConfigChange, PumpCause};
use super::ports::{EventSink, PumpPort};

/// Apply `msg` and re-evaluate.  Returns the evaluation's decision.
pub fn reconcile(
    engine: &mut IrrigationEngine,
    msg: &InboundMessage,
    now_ms: u64,
    pump: &mut impl PumpPort,
    sink: &mut impl EventSink,
) -> Decision {
    let structured = msg.commands.filter(|c| *c != ZoneCommands::default());
    match (structured, msg.pump_command) {
        (Some(cmds), _) => apply_commands(engine, &cmds, pump, sink),
        (None, Some(on)) => apply_legacy(engine, on, pump, sink),
        (None, None) => debug!("Backend sent no commands"),
    }
    engine.evaluate(now_ms, pump, sink)
}

fn apply_commands(
    engine: &mut IrrigationEngine,
    cmds: &ZoneCommands,
    pump: &mut impl PumpPort,
    sink: &mut impl EventSink,
) {
    // ── 1. Auto mode ──────────────────────────────────────────
    if let Some(enabled) = cmds.auto_mode {
        let config = engine.config_mut();
        if config.auto_mode_enabled != enabled {
            config.auto_mode_enabled = enabled;
            info!("Auto mode {}", if enabled { "enabled" } else { "disabled" });
            sink.emit(&AppEvent::ConfigChanged(ConfigChange::AutoMode(enabled)));
            if !enabled && engine.session().is_some() {
                engine.stop(EndReason::AutoModeDisabled, pump, sink);
            }
        }
    }

    // ── 2. Threshold / duration ───────────────────────────────
    match (cmds.moisture_threshold, cmds.valid_threshold()) {
        (Some(_), Some(threshold)) => {
            let config = engine.config_mut();
            if config.moisture_threshold_pct != threshold {
                config.moisture_threshold_pct = threshold;
                info!("Moisture threshold {threshold:.1}%");
                sink.emit(&AppEvent::ConfigChanged(ConfigChange::MoistureThreshold(threshold)));
            }
        }
        (Some(rejected), None) => warn!("Ignoring moisture threshold {rejected}"),
        (None, _) => {}
    }

    if let Some(secs) = cmds.valid_duration_secs() {
        if cmds.watering_duration.is_some_and(|d| d < 1.0) {
            debug!("Watering duration {:?} floored to 1s", cmds.watering_duration);
        }
        let config = engine.config_mut();
        if config.watering_duration_secs != secs {
            config.watering_duration_secs = secs;
            info!("Watering duration {secs}s");
            sink.emit(&AppEvent::ConfigChanged(ConfigChange::WateringDuration(secs)));
        }
    }

    // ── 3. Tank lock ──────────────────────────────────────────
    if let Some(locked) = cmds.tank_locked {
        let config = engine.config_mut();
        if config.tank_locked != locked {
            config.tank_locked = locked;
            info!("Tank {}", if locked { "locked" } else { "unlocked" });
            sink.emit(&AppEvent::ConfigChanged(ConfigChange::TankLocked(locked)));
        }
    }
    if engine.config().tank_locked {
        if pump.is_pump_on() || engine.session().is_some() {
            warn!("Tank locked: forcing pump off");
            engine.stop(EndReason::TankLocked, pump, sink);
            sink.emit(&AppEvent::TankLockEnforced);
        }
        if let Some(requested_on) = cmds.pump_state {
            warn!("Manual pump command ignored: tank locked");
            sink.emit(&AppEvent::ManualRejected { requested_on });
        }
        return;
    }

    // ── 4. Manual override ────────────────────────────────────
    if let Some(on) = cmds.pump_state {
        apply_manual(engine, on, PumpCause::Manual, pump, sink);
    }
}

fn apply_legacy(
    engine: &mut IrrigationEngine,
    on: bool,
    pump: &mut impl PumpPort,
    sink: &mut impl EventSink,
) {
    if on && engine.config().tank_locked {
        warn!("Legacy pump command ignored: tank locked");
        sink.emit(&AppEvent::ManualRejected { requested_on: on });
        return;
    }
    apply_manual(engine, on, PumpCause::Legacy, pump, sink);
}

fn apply_manual(
    engine: &mut IrrigationEngine,
    on: bool,
    cause: PumpCause,
    pump: &mut impl PumpPort,
    sink: &mut impl EventSink,
) {
    info!("Manual pump command: {}", if on { "ON" } else { "OFF" });
    engine.end_session(EndReason::ManualOverride, sink);
    if pump.is_pump_on() != on && pump.set_pump(on) {
        sink.emit(&AppEvent::PumpChanged { on, cause });
    }
    sink.emit(&AppEvent::ManualOverride { on });
}
