//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (sensors, pump relay, event sinks, backend uplink)
//! implement these traits.  The [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::UplinkError;
use crate::sensors::RawSample;

use super::commands::InboundMessage;
use super::events::AppEvent;
use super::report::SensorReport;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per acquisition cycle.
pub trait SensorPort {
    /// Read every channel; each carries its own outcome.
    fn sample(&mut self) -> RawSample;
}

// ───────────────────────────────────────────────────────────────
// Pump port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the single pump.
pub trait PumpPort {
    /// Set the logical pump state and re-drive the output.  Returns `true`
    /// when the logical state changed.
    fn set_pump(&mut self, on: bool) -> bool;

    /// Current logical pump state.
    fn is_pump_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Uplink port (driven adapter: domain ↔ backend)
// ───────────────────────────────────────────────────────────────

/// Report / command exchange with the backend.
pub trait UplinkPort {
    /// Connectivity signal; reporting is suppressed while `false`.
    fn is_connected(&self) -> bool;

    /// Send one report and return the backend's (already parsed) reply.
    fn exchange(&mut self, report: &SensorReport) -> Result<InboundMessage, UplinkError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    #[derive(Debug, Default)]
    pub struct FakePump {
        pub on: bool,
        pub writes: u32,
    }

    impl PumpPort for FakePump {
        fn set_pump(&mut self, on: bool) -> bool {
            self.writes += 1;
            let changed = self.on != on;
            self.on = on;
            changed
        }

        fn is_pump_on(&self) -> bool {
            self.on
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub events: Vec<AppEvent>,
    }

    impl RecordingSink {
        pub fn contains(&self, f: impl Fn(&AppEvent) -> bool) -> bool {
            self.events.iter().any(f)
        }

        pub fn count(&self, f: impl Fn(&AppEvent) -> bool) -> usize {
            self.events.iter().filter(|e| f(e)).count()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &AppEvent) {
            self.events.push(event.clone());
        }
    }
}
