//! Fuzz target: backend reply → `InboundMessage::from_json` → `reconcile`
//!
//! Arbitrary response bodies must never panic the parser, and whatever
//! parses must leave the engine consistent: a locked tank means the pump
//! is off and no session runs.
//!
//! cargo fuzz run fuzz_inbound_commands

#![no_main]

use agromind::app::commands::InboundMessage;
use agromind::app::events::AppEvent;
use agromind::app::ports::{EventSink, PumpPort};
use agromind::app::reconciler::reconcile;
use agromind::fsm::context::ArbitrationTuning;
use agromind::fsm::{IrrigationEngine, StateId};
use libfuzzer_sys::fuzz_target;

struct Pump(bool);

impl PumpPort for Pump {
    fn set_pump(&mut self, on: bool) -> bool {
        let changed = self.0 != on;
        self.0 = on;
        changed
    }

    fn is_pump_on(&self) -> bool {
        self.0
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(msg) = InboundMessage::from_json(data) else {
        return;
    };

    let mut engine = IrrigationEngine::new(ArbitrationTuning::default());
    engine.readings_mut().record_soil(20.0);
    engine.readings_mut().record_tank(50.0);
    let mut pump = Pump(false);

    // Apply twice: once from idle, once on top of the resulting state.
    for now_ms in [0, 1_000] {
        reconcile(&mut engine, &msg, now_ms, &mut pump, &mut Discard);

        let config = engine.config();
        assert!(config.moisture_threshold_pct > 0.0);
        assert!(config.watering_duration_secs >= 1);
        if config.tank_locked {
            assert!(!pump.0, "pump on while tank locked");
            assert_eq!(engine.state(), StateId::Idle);
        }
        if engine.state() == StateId::AutoWatering {
            assert!(pump.0, "session without pump");
        }
    }
});
