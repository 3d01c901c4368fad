//! Mock adapters for integration tests.
//!
//! Records every pump write, report and event so tests can assert on the
//! full history without touching real GPIO or a network.

use std::collections::VecDeque;

use agromind::app::commands::InboundMessage;
use agromind::app::events::AppEvent;
use agromind::app::ports::{EventSink, PumpPort, SensorPort, UplinkPort};
use agromind::app::report::SensorReport;
use agromind::error::{SensorError, UplinkError};
use agromind::sensors::RawSample;
use agromind::sensors::dht::ClimateSample;

// ── ADC / echo values for the default calibration ─────────────

/// Raw soil ADC for a moisture percentage (dry 3200 → 0 %, wet 700 → 100 %).
pub fn soil_adc(pct: f32) -> u16 {
    (3200.0 - pct * 25.0).round() as u16
}

/// Echo width for a fill percentage of the default 17 cm tank.
pub fn echo_us(fill_pct: f32) -> u32 {
    let distance_cm = 17.0 * (1.0 - fill_pct / 100.0);
    (distance_cm * 2.0 / 0.0343).round() as u32
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub sample: RawSample,
    pub pump_on: bool,
    /// Every `set_pump` call, in order.
    pub pump_writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockHardware {
    /// Healthy sensors: 22 °C / 55 %, soil 50 %, tank 50 %, mid light.
    pub fn new() -> Self {
        Self {
            sample: RawSample {
                climate: Ok(ClimateSample {
                    temperature_c: 22.0,
                    humidity_pct: 55.0,
                }),
                soil_adc: Ok(soil_adc(50.0)),
                light_adc: Ok(2000),
                echo_us: Ok(echo_us(50.0)),
            },
            pump_on: false,
            pump_writes: Vec::new(),
        }
    }

    pub fn set_soil_pct(&mut self, pct: f32) {
        self.sample.soil_adc = Ok(soil_adc(pct));
    }

    pub fn set_tank_pct(&mut self, pct: f32) {
        self.sample.echo_us = Ok(echo_us(pct));
    }

    pub fn fail_echo(&mut self) {
        self.sample.echo_us = Err(SensorError::EchoTimeout);
    }

    pub fn fail_soil(&mut self) {
        self.sample.soil_adc = Err(SensorError::AdcReadFailed);
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn sample(&mut self) -> RawSample {
        self.sample
    }
}

impl PumpPort for MockHardware {
    fn set_pump(&mut self, on: bool) -> bool {
        self.pump_writes.push(on);
        let changed = self.pump_on != on;
        self.pump_on = on;
        changed
    }

    fn is_pump_on(&self) -> bool {
        self.pump_on
    }
}

// ── MockUplink ────────────────────────────────────────────────

pub struct MockUplink {
    pub connected: bool,
    /// Replies handed out in order; an empty queue answers with no commands.
    pub replies: VecDeque<Result<InboundMessage, UplinkError>>,
    pub sent: Vec<SensorReport>,
}

#[allow(dead_code)]
impl MockUplink {
    pub fn new() -> Self {
        Self {
            connected: true,
            replies: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    /// Queue a backend reply given as JSON.
    pub fn reply_json(&mut self, body: &str) {
        self.replies
            .push_back(InboundMessage::from_json(body.as_bytes()));
    }

    pub fn fail_next(&mut self, e: UplinkError) {
        self.replies.push_back(Err(e));
    }
}

impl Default for MockUplink {
    fn default() -> Self {
        Self::new()
    }
}

impl UplinkPort for MockUplink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn exchange(&mut self, report: &SensorReport) -> Result<InboundMessage, UplinkError> {
        let reply = self
            .replies
            .pop_front()
            .unwrap_or(Ok(InboundMessage::default()));
        if reply.is_ok() {
            self.sent.push(*report);
        }
        reply
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
