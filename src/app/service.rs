//! Application service: the hexagonal core.
//!
//! [`NodeService`] owns the irrigation engine and the signal conditioner.
//! It exposes a clean, hardware-agnostic API.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │         NodeService          │
//!    PumpPort ◀── │ Conditioner · Engine · Rules │ ◀─▶ UplinkPort
//!                 └─────────────────────────────┘
//! ```
//!
//! The control loop calls [`tick`](NodeService::tick) once per sample
//! interval, [`sync`](NodeService::sync) right after it, and
//! [`poll`](NodeService::poll) in between so session deadlines are honoured
//! to within one poll period.

use log::{info, warn};

use crate::config::NodeConfig;
use crate::fsm::context::CalibratedReading;
use crate::fsm::rules::Decision;
use crate::fsm::{IrrigationEngine, StateId};
use crate::sensors::conditioning::SignalConditioner;

use super::commands::InboundMessage;
use super::events::{AppEvent, SuppressReason};
use super::ports::{EventSink, PumpPort, SensorPort, UplinkPort};
use super::reconciler;
use super::report::SensorReport;

/// Outcome of one [`NodeService::sync`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Nothing sent.
    Suppressed(SuppressReason),
    /// Report sent; the reply was reconciled.
    Exchanged(Decision),
    /// Report could not be delivered; nothing was reconciled.
    Failed,
}

pub struct NodeService {
    engine: IrrigationEngine,
    conditioner: SignalConditioner,
    zone_id: Option<u32>,
    cycles: u64,
}

impl NodeService {
    /// Construct the service from deployment configuration.
    ///
    /// Does **not** touch the pump; call [`start`](Self::start) next.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            engine: IrrigationEngine::new(config.tuning()),
            conditioner: SignalConditioner::new(config),
            zone_id: config.zone_id,
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Re-assert the pump off level and announce the initial state.
    pub fn start(&mut self, pump: &mut impl PumpPort, sink: &mut impl EventSink) {
        pump.set_pump(false);
        sink.emit(&AppEvent::Started(self.engine.state()));
        info!(
            "NodeService started in {:?}, zone {:?}",
            self.engine.state(),
            self.zone_id
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// One acquisition cycle: sample → condition → evaluate.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`PumpPort`], which avoids a double mutable borrow while keeping the
    /// port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + PumpPort),
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Decision {
        self.cycles += 1;

        let raw = hw.sample();
        let faults = self
            .conditioner
            .condition(&raw, self.engine.readings_mut(), now_ms);
        for (channel, error) in faults {
            warn!("Sensor fault on {:?}: {}", channel, error);
            sink.emit(&AppEvent::SensorFault { channel, error });
        }

        self.engine.evaluate(now_ms, hw, sink)
    }

    /// Evaluate against cached readings (no sampling).
    pub fn poll(
        &mut self,
        pump: &mut impl PumpPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Decision {
        self.engine.evaluate(now_ms, pump, sink)
    }

    /// Apply a backend reply that arrived outside [`sync`](Self::sync).
    pub fn handle_message(
        &mut self,
        msg: &InboundMessage,
        pump: &mut impl PumpPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Decision {
        reconciler::reconcile(&mut self.engine, msg, now_ms, pump, sink)
    }

    /// Report the cached readings and reconcile the reply.
    pub fn sync(
        &mut self,
        uplink: &mut impl UplinkPort,
        pump: &mut impl PumpPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> SyncOutcome {
        if !uplink.is_connected() {
            return self.suppress(SuppressReason::NotConnected, sink);
        }
        let Some(report) = self.build_report(pump.is_pump_on()) else {
            return self.suppress(SuppressReason::NoZoneIdentity, sink);
        };

        match uplink.exchange(&report) {
            Ok(msg) => {
                sink.emit(&AppEvent::ReportSent(report));
                SyncOutcome::Exchanged(self.handle_message(&msg, pump, now_ms, sink))
            }
            Err(e) => {
                warn!("Uplink exchange failed: {e}");
                sink.emit(&AppEvent::UplinkFailed(e));
                SyncOutcome::Failed
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Report for the current readings; `None` while the node has no zone.
    pub fn build_report(&self, pump_on: bool) -> Option<SensorReport> {
        let zone_id = self.zone_id?;
        Some(SensorReport::new(zone_id, self.engine.readings().latest(), pump_on))
    }

    pub fn state(&self) -> StateId {
        self.engine.state()
    }

    pub fn engine(&self) -> &IrrigationEngine {
        &self.engine
    }

    pub fn readings(&self) -> &CalibratedReading {
        self.engine.readings().latest()
    }

    /// Acquisition cycles since startup.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Pair (or unpair) the node with a backend zone.
    pub fn set_zone_id(&mut self, zone_id: Option<u32>) {
        self.zone_id = zone_id;
    }

    // ── Internal ──────────────────────────────────────────────

    fn suppress(&self, reason: SuppressReason, sink: &mut impl EventSink) -> SyncOutcome {
        sink.emit(&AppEvent::ReportSuppressed(reason));
        SyncOutcome::Suppressed(reason)
    }
}
