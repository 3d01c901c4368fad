//! Engine context: the data every arbitration rule reads.
//!
//! `ZoneConfig` is the remotely mutable half (written only by the command
//! reconciler), `ArbitrationTuning` the deployment-fixed half.  The
//! `ReadingCache` holds the last calibrated value of every channel so that
//! evaluations between sensor cycles still have something to decide on.

// ---------------------------------------------------------------------------
// Zone configuration (remote)
// ---------------------------------------------------------------------------

/// Settings the backend can change at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneConfig {
    pub auto_mode_enabled: bool,
    /// Soil moisture (%) below which an auto-watering session starts.
    pub moisture_threshold_pct: f32,
    /// Upper bound on one auto-watering session.
    pub watering_duration_secs: u32,
    /// Remote safety lock: pump stays off while set.
    pub tank_locked: bool,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            auto_mode_enabled: false,
            moisture_threshold_pct: 30.0,
            watering_duration_secs: 10,
            tank_locked: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Arbitration tuning (deployment)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrationTuning {
    /// Points above the threshold before a session counts as recovered.
    pub hysteresis_margin_pct: f32,
    /// Tank level (%) at or below which the pump is forced off.
    pub min_tank_pct: f32,
}

impl Default for ArbitrationTuning {
    fn default() -> Self {
        Self {
            hysteresis_margin_pct: 5.0,
            min_tank_pct: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Calibrated readings
// ---------------------------------------------------------------------------

/// Latest calibrated value of every channel.  Percentages are in [0, 100].
///
/// Zero is also the "never sampled" value; `sampled_at_ms` tells the two
/// apart for consumers that care.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibratedReading {
    pub temperature_c: f32,
    pub ambient_humidity_pct: f32,
    pub soil_moisture_pct: f32,
    pub tank_level_pct: f32,
    pub light_pct: f32,
    /// Uptime of the last acquisition cycle, `None` before the first one.
    pub sampled_at_ms: Option<u64>,
}

/// Holds the most recent [`CalibratedReading`].
///
/// Each channel is recorded independently: a channel whose acquisition
/// failed is simply not recorded and keeps its previous value.
#[derive(Debug, Clone, Default)]
pub struct ReadingCache {
    latest: CalibratedReading,
}

impl ReadingCache {
    pub fn latest(&self) -> &CalibratedReading {
        &self.latest
    }

    /// Both arbitration inputs still at their zero sentinel.
    pub fn has_readings(&self) -> bool {
        self.latest.soil_moisture_pct != 0.0 || self.latest.tank_level_pct != 0.0
    }

    pub fn record_climate(&mut self, temperature_c: f32, humidity_pct: f32) {
        if temperature_c.is_finite() {
            self.latest.temperature_c = temperature_c;
        }
        store_pct(&mut self.latest.ambient_humidity_pct, humidity_pct);
    }

    pub fn record_soil(&mut self, pct: f32) {
        store_pct(&mut self.latest.soil_moisture_pct, pct);
    }

    pub fn record_light(&mut self, pct: f32) {
        store_pct(&mut self.latest.light_pct, pct);
    }

    pub fn record_tank(&mut self, pct: f32) {
        store_pct(&mut self.latest.tank_level_pct, pct);
    }

    /// Mark the end of an acquisition cycle.
    pub fn stamp(&mut self, now_ms: u64) {
        self.latest.sampled_at_ms = Some(now_ms);
    }
}

/// NaN keeps the previous value.
fn store_pct(slot: &mut f32, pct: f32) {
    if !pct.is_nan() {
        *slot = pct.clamp(0.0, 100.0);
    }
}

// ---------------------------------------------------------------------------
// Auto-watering session
// ---------------------------------------------------------------------------

/// A bounded interval during which the engine holds the pump on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoWateringSession {
    pub started_at_ms: u64,
    pub deadline_ms: u64,
}

impl AutoWateringSession {
    pub fn new(now_ms: u64, duration_secs: u32) -> Self {
        Self {
            started_at_ms: now_ms,
            deadline_ms: now_ms.saturating_add(u64::from(duration_secs) * 1000),
        }
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms
    }
}
