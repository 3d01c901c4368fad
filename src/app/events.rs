//! Outbound application events.
//!
//! The engine, the reconciler and the [`NodeService`](super::service::NodeService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them (serial log
//! today).

use crate::error::{SensorError, UplinkError};
use crate::fsm::{EndReason, StateId};
use crate::sensors::conditioning::SensorChannel;

use super::report::SensorReport;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// The pump output changed.
    PumpChanged { on: bool, cause: PumpCause },

    /// An auto-watering session began.
    SessionStarted { deadline_ms: u64 },

    /// An auto-watering session ended.
    SessionEnded { reason: EndReason, started_at_ms: u64 },

    /// A remote command changed zone configuration.
    ConfigChanged(ConfigChange),

    /// A tank lock pre-empted pump operation.
    TankLockEnforced,

    /// A manual pump command was applied (or confirmed the current state).
    ManualOverride { on: bool },

    /// A manual pump command was refused because the tank is locked.
    ManualRejected { requested_on: bool },

    /// One channel failed acquisition this cycle.
    SensorFault { channel: SensorChannel, error: SensorError },

    /// A report was sent to the backend.
    ReportSent(SensorReport),

    /// Reporting skipped this cycle.
    ReportSuppressed(SuppressReason),

    /// The backend exchange failed.
    UplinkFailed(UplinkError),
}

/// What moved the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpCause {
    /// Auto-watering session start.
    AutoStart,
    /// Forced or scheduled stop.
    Stopped(EndReason),
    /// Structured `pumpState` command.
    Manual,
    /// Legacy `pumpCommand` field.
    Legacy,
}

/// One applied zone-configuration change, carrying the new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    AutoMode(bool),
    MoistureThreshold(f32),
    WateringDuration(u32),
    TankLocked(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    NotConnected,
    NoZoneIdentity,
}
