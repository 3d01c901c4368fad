//! Tank interlock.
//!
//! Runs **before every arbitration** and decides whether the pump may run
//! at all.  Two conditions trip it:
//!
//! 1. the backend has locked the tank (`ZoneConfig::tank_locked`), or
//! 2. the measured tank level is at or below the deployment minimum.
//!
//! The interlock latches only for logging: set/clear edges are logged once,
//! and the fault is re-evaluated from scratch on every call.

use core::fmt;

use log::{error, info};

use crate::fsm::context::{ArbitrationTuning, CalibratedReading, ZoneConfig};

/// Why the pump is not allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankFault {
    /// Remote lock asserted.
    Locked,
    /// Water level at or below the minimum.
    LevelLow,
}

impl fmt::Display for TankFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "tank locked"),
            Self::LevelLow => write!(f, "tank level low"),
        }
    }
}

/// Pure check: lock first, then level.
pub fn tank_fault(
    config: &ZoneConfig,
    reading: &CalibratedReading,
    tuning: &ArbitrationTuning,
) -> Option<TankFault> {
    if config.tank_locked {
        Some(TankFault::Locked)
    } else if reading.tank_level_pct <= tuning.min_tank_pct {
        Some(TankFault::LevelLow)
    } else {
        None
    }
}

/// Edge-logging wrapper around [`tank_fault`].
#[derive(Debug, Default)]
pub struct TankInterlock {
    active: Option<TankFault>,
}

impl TankInterlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(
        &mut self,
        config: &ZoneConfig,
        reading: &CalibratedReading,
        tuning: &ArbitrationTuning,
    ) -> Option<TankFault> {
        let fault = tank_fault(config, reading, tuning);
        if fault != self.active {
            match (self.active, fault) {
                (_, Some(f)) => error!(
                    "SAFETY FAULT SET: {f} (level {:.1}%)",
                    reading.tank_level_pct
                ),
                (Some(prev), None) => info!("SAFETY FAULT CLEARED: {prev}"),
                (None, None) => {}
            }
            self.active = fault;
        }
        fault
    }

    /// Fault seen by the last evaluation.
    pub fn active(&self) -> Option<TankFault> {
        self.active
    }
}
