//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  Each event is one
//! tagged line so the serial console can be grepped by subsystem.

use log::{info, warn};

use crate::app::events::{AppEvent, ConfigChange, PumpCause};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::PumpChanged { on, cause } => {
                let state = if *on { "ON" } else { "OFF" };
                match cause {
                    PumpCause::AutoStart => info!("PUMP | {} | auto start", state),
                    PumpCause::Stopped(reason) => info!("PUMP | {} | {}", state, reason),
                    PumpCause::Manual => info!("PUMP | {} | manual", state),
                    PumpCause::Legacy => info!("PUMP | {} | legacy command", state),
                }
            }
            AppEvent::SessionStarted { deadline_ms } => {
                info!("SESSION | started | deadline={}ms", deadline_ms);
            }
            AppEvent::SessionEnded {
                reason,
                started_at_ms,
            } => {
                info!("SESSION | ended | {} | started={}ms", reason, started_at_ms);
            }
            AppEvent::ConfigChanged(change) => match change {
                ConfigChange::AutoMode(on) => info!("CONFIG | autoMode={}", on),
                ConfigChange::MoistureThreshold(pct) => {
                    info!("CONFIG | moistureThreshold={:.1}%", pct);
                }
                ConfigChange::WateringDuration(secs) => {
                    info!("CONFIG | wateringDuration={}s", secs);
                }
                ConfigChange::TankLocked(locked) => info!("CONFIG | tankLocked={}", locked),
            },
            AppEvent::TankLockEnforced => {
                warn!("SAFETY | tank lock enforced, pump forced off");
            }
            AppEvent::ManualOverride { on } => {
                info!("PUMP | manual override {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::ManualRejected { requested_on } => {
                warn!(
                    "SAFETY | manual {} rejected, tank locked",
                    if *requested_on { "ON" } else { "OFF" }
                );
            }
            AppEvent::SensorFault { channel, error } => {
                warn!("SENSOR | {:?} | {}", channel, error);
            }
            AppEvent::ReportSent(report) => {
                let s = &report.sensors;
                info!(
                    "REPORT | zone={} | T={:.1}\u{00b0}C RH={:.1}% soil={:.1}% \
                     tank={:.1}% light={:.1}% | pump={}",
                    report.zone_id,
                    s.temperature,
                    s.ambient_humidity,
                    s.soil_moisture,
                    s.water_level,
                    s.light_level,
                    if s.pump_status { "ON" } else { "OFF" },
                );
            }
            AppEvent::ReportSuppressed(reason) => {
                info!("REPORT | suppressed | {:?}", reason);
            }
            AppEvent::UplinkFailed(e) => {
                warn!("REPORT | uplink failed | {}", e);
            }
        }
    }
}
