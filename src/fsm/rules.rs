//! Ordered arbitration rules.
//!
//! ```text
//! ┌───┬──────────────────┬─────────────────────────────────────────────┐
//! │ # │ rule             │ verdict                                     │
//! ├───┼──────────────────┼─────────────────────────────────────────────┤
//! │ 1 │ AutoModeDisabled │ session? → pump off            else hold    │
//! │ 2 │ NoReadingsYet    │ hold                                        │
//! │ 3 │ TankUnavailable  │ pump off, cancel session                    │
//! │ 4 │ SessionActive    │ recovered | deadline → pump off  else hold  │
//! │ 5 │ ManualHold       │ hold (pump held on by a manual command)     │
//! │ 6 │ StartSession     │ 0 < soil < threshold → start   else hold    │
//! └───┴──────────────────┴─────────────────────────────────────────────┘
//! ```
//!
//! Rules run top to bottom; the first one that matches decides and nothing
//! below it is consulted.  The last rule always matches, so every
//! evaluation yields exactly one [`Decision`].

use super::EndReason;
use super::context::{ArbitrationTuning, AutoWateringSession, CalibratedReading, ZoneConfig};
use crate::safety::TankFault;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInputs<'a> {
    pub config: &'a ZoneConfig,
    pub tuning: &'a ArbitrationTuning,
    pub reading: &'a CalibratedReading,
    pub has_readings: bool,
    pub tank_fault: Option<TankFault>,
    pub pump_on: bool,
    pub session: Option<&'a AutoWateringSession>,
    pub now_ms: u64,
}

/// What the engine should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Leave pump and session as they are.
    Hold,
    /// Pump off and any session ended.
    PumpOff(EndReason),
    /// Pump on under a new session.
    StartSession(AutoWateringSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RuleId {
    AutoModeDisabled = 0,
    NoReadingsYet = 1,
    TankUnavailable = 2,
    SessionActive = 3,
    ManualHold = 4,
    StartSession = 5,
}

impl RuleId {
    pub const COUNT: usize = 6;
}

/// Which rule decided, and what it decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: RuleId,
    pub verdict: Verdict,
}

/// Returns `Some` when the rule matches.
pub type RuleFn = fn(&RuleInputs<'_>) -> Option<Verdict>;

/// One row of the precedence table.
pub struct Rule {
    pub id: RuleId,
    pub name: &'static str,
    pub check: RuleFn,
}

/// The precedence table, highest priority first.
pub static RULES: [Rule; RuleId::COUNT] = [
    Rule {
        id: RuleId::AutoModeDisabled,
        name: "auto-mode-disabled",
        check: auto_mode_disabled,
    },
    Rule {
        id: RuleId::NoReadingsYet,
        name: "no-readings-yet",
        check: no_readings_yet,
    },
    Rule {
        id: RuleId::TankUnavailable,
        name: "tank-unavailable",
        check: tank_unavailable,
    },
    Rule {
        id: RuleId::SessionActive,
        name: "session-active",
        check: session_active,
    },
    Rule {
        id: RuleId::ManualHold,
        name: "manual-hold",
        check: manual_hold,
    },
    Rule {
        id: RuleId::StartSession,
        name: "start-session",
        check: start_session,
    },
];

/// Walk [`RULES`] and return the first match.
pub fn arbitrate(inputs: &RuleInputs<'_>) -> Decision {
    for rule in &RULES {
        if let Some(verdict) = (rule.check)(inputs) {
            return Decision {
                rule: rule.id,
                verdict,
            };
        }
    }
    // Unreachable while `start_session` always matches.
    Decision {
        rule: RuleId::StartSession,
        verdict: Verdict::Hold,
    }
}

/// Table name of `id`.
pub fn rule_name(id: RuleId) -> &'static str {
    RULES[id as usize].name
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn auto_mode_disabled(i: &RuleInputs<'_>) -> Option<Verdict> {
    if i.config.auto_mode_enabled {
        return None;
    }
    Some(match i.session {
        Some(_) => Verdict::PumpOff(EndReason::AutoModeDisabled),
        None => Verdict::Hold,
    })
}

fn no_readings_yet(i: &RuleInputs<'_>) -> Option<Verdict> {
    (!i.has_readings).then_some(Verdict::Hold)
}

fn tank_unavailable(i: &RuleInputs<'_>) -> Option<Verdict> {
    i.tank_fault.map(|f| Verdict::PumpOff(EndReason::from(f)))
}

fn session_active(i: &RuleInputs<'_>) -> Option<Verdict> {
    let session = i.session?;
    let soil = i.reading.soil_moisture_pct;
    let recovered_at = i.config.moisture_threshold_pct + i.tuning.hysteresis_margin_pct;
    Some(if soil >= recovered_at {
        Verdict::PumpOff(EndReason::Recovered)
    } else if session.expired(i.now_ms) {
        Verdict::PumpOff(EndReason::Timeout)
    } else {
        Verdict::Hold
    })
}

fn manual_hold(i: &RuleInputs<'_>) -> Option<Verdict> {
    i.pump_on.then_some(Verdict::Hold)
}

fn start_session(i: &RuleInputs<'_>) -> Option<Verdict> {
    let soil = i.reading.soil_moisture_pct;
    Some(if soil > 0.0 && soil < i.config.moisture_threshold_pct {
        Verdict::StartSession(AutoWateringSession::new(
            i.now_ms,
            i.config.watering_duration_secs,
        ))
    } else {
        Verdict::Hold
    })
}
