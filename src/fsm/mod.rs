//! Auto-irrigation state machine.
//!
//! Two states, one pump:
//!
//! ```text
//!            start-session (0 < soil < threshold)
//!   ┌──────┐ ─────────────────────────────────────▶ ┌──────────────┐
//!   │ Idle │                                        │ AutoWatering │
//!   └──────┘ ◀───────────────────────────────────── └──────────────┘
//!      recovered · deadline · tank low/locked · auto off · manual
//! ```
//!
//! [`IrrigationEngine`] is the context object: it owns the zone
//! configuration, the reading cache, and the current session.  Every
//! evaluation walks the ordered rule table in [`rules`] and applies the
//! single resulting verdict through the [`PumpPort`].  The command
//! reconciler gets `&mut` access to the same engine, so there is exactly
//! one writer of this state at any time.

pub mod context;
pub mod rules;

use core::fmt;

use log::{debug, info};

use crate::app::events::{AppEvent, PumpCause};
use crate::app::ports::{EventSink, PumpPort};
use crate::safety::{TankFault, TankInterlock};
use context::{ArbitrationTuning, AutoWateringSession, ReadingCache, ZoneConfig};
use rules::{Decision, RuleInputs, Verdict, arbitrate, rule_name};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    AutoWatering = 1,
}

/// Why a session ended or the pump was forced off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Auto mode switched off.
    AutoModeDisabled,
    /// Remote tank lock.
    TankLocked,
    /// Tank at or below the minimum level.
    TankLow,
    /// Soil reached threshold + hysteresis.
    Recovered,
    /// Session deadline passed.
    Timeout,
    /// A manual pump command took over.
    ManualOverride,
}

impl From<TankFault> for EndReason {
    fn from(f: TankFault) -> Self {
        match f {
            TankFault::Locked => Self::TankLocked,
            TankFault::LevelLow => Self::TankLow,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AutoModeDisabled => "auto mode disabled",
            Self::TankLocked => "tank locked",
            Self::TankLow => "tank low",
            Self::Recovered => "moisture recovered",
            Self::Timeout => "deadline reached",
            Self::ManualOverride => "manual override",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct IrrigationEngine {
    config: ZoneConfig,
    tuning: ArbitrationTuning,
    readings: ReadingCache,
    /// `Some` exactly while in [`StateId::AutoWatering`].
    session: Option<AutoWateringSession>,
    interlock: TankInterlock,
    evaluations: u64,
}

impl IrrigationEngine {
    /// Idle, default zone configuration, empty reading cache.
    pub fn new(tuning: ArbitrationTuning) -> Self {
        Self {
            config: ZoneConfig::default(),
            tuning,
            readings: ReadingCache::default(),
            session: None,
            interlock: TankInterlock::new(),
            evaluations: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        if self.session.is_some() {
            StateId::AutoWatering
        } else {
            StateId::Idle
        }
    }

    pub fn session(&self) -> Option<&AutoWateringSession> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    pub fn tuning(&self) -> &ArbitrationTuning {
        &self.tuning
    }

    pub fn readings(&self) -> &ReadingCache {
        &self.readings
    }

    pub fn tank_fault(&self) -> Option<TankFault> {
        self.interlock.active()
    }

    /// Evaluations run since boot.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Only the command reconciler writes zone configuration.
    pub(crate) fn config_mut(&mut self) -> &mut ZoneConfig {
        &mut self.config
    }

    /// Written by the signal conditioner once per sample cycle.
    pub fn readings_mut(&mut self) -> &mut ReadingCache {
        &mut self.readings
    }

    /// Walk the rule table once and apply its verdict.
    pub fn evaluate(
        &mut self,
        now_ms: u64,
        pump: &mut impl PumpPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        self.evaluations += 1;
        let reading = *self.readings.latest();
        let has_readings = self.readings.has_readings();
        // The zero sentinel before the first sample is not a low tank.
        let tank_fault = if has_readings {
            self.interlock.evaluate(&self.config, &reading, &self.tuning)
        } else {
            None
        };

        let decision = arbitrate(&RuleInputs {
            config: &self.config,
            tuning: &self.tuning,
            reading: &reading,
            has_readings,
            tank_fault,
            pump_on: pump.is_pump_on(),
            session: self.session.as_ref(),
            now_ms,
        });

        match decision.verdict {
            Verdict::Hold => {
                debug!("Arbitration: hold ({})", rule_name(decision.rule));
            }
            Verdict::PumpOff(reason) => self.stop(reason, pump, sink),
            Verdict::StartSession(session) => self.start(session, reading.soil_moisture_pct, pump, sink),
        }
        decision
    }

    /// Force the pump off and end any session.  No-op when the pump is
    /// already off and no session is running.
    pub fn stop(&mut self, reason: EndReason, pump: &mut impl PumpPort, sink: &mut impl EventSink) {
        if pump.is_pump_on() && pump.set_pump(false) {
            sink.emit(&AppEvent::PumpChanged {
                on: false,
                cause: PumpCause::Stopped(reason),
            });
        }
        self.end_session(reason, sink);
    }

    /// Drop the session without touching the pump.  Returns whether one was
    /// running.
    pub fn end_session(&mut self, reason: EndReason, sink: &mut impl EventSink) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        info!("FSM transition: AutoWatering -> Idle ({reason})");
        sink.emit(&AppEvent::SessionEnded {
            reason,
            started_at_ms: session.started_at_ms,
        });
        true
    }

    fn start(
        &mut self,
        session: AutoWateringSession,
        soil_pct: f32,
        pump: &mut impl PumpPort,
        sink: &mut impl EventSink,
    ) {
        info!(
            "FSM transition: Idle -> AutoWatering (soil {:.1}% < {:.1}%, until t={}ms)",
            soil_pct, self.config.moisture_threshold_pct, session.deadline_ms
        );
        self.session = Some(session);
        if pump.set_pump(true) {
            sink.emit(&AppEvent::PumpChanged {
                on: true,
                cause: PumpCause::AutoStart,
            });
        }
        sink.emit(&AppEvent::SessionStarted {
            deadline_ms: session.deadline_ms,
        });
    }
}
