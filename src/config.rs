//! Deployment configuration
//!
//! Calibration constants and tuning for one installed node.  These are
//! fixed at deployment (compiled in, optionally overridden by a JSON
//! document at build time) and are never touched by remote commands.
//! The remotely mutable settings live in
//! [`ZoneConfig`](crate::fsm::context::ZoneConfig).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fsm::context::ArbitrationTuning;
use crate::sensors::calibration::LinearMap;
use crate::sensors::dht::DhtModel;
use crate::sensors::ultrasonic::TankGeometry;

/// Node deployment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- Identity ---
    /// Backend zone this node reports for.  `None` until the node is paired;
    /// reporting is suppressed while absent.
    pub zone_id: Option<u32>,

    // --- Timing ---
    /// Sensor acquisition + report cycle (milliseconds)
    pub sample_interval_ms: u32,
    /// Control-loop poll between sample cycles (milliseconds)
    pub control_poll_ms: u32,

    // --- Soil moisture probe (capacitive, ADC1) ---
    /// Raw ADC value with the probe in dry air (maps to 0 %)
    pub soil_dry_adc: f32,
    /// Raw ADC value with the probe in water (maps to 100 %)
    pub soil_wet_adc: f32,

    // --- Light (LDR divider, ADC1) ---
    /// Raw ADC value with the LDR covered (maps to 0 %)
    pub light_dark_adc: f32,
    /// Raw ADC value under direct light (maps to 100 %)
    pub light_bright_adc: f32,

    // --- Tank (HC-SR04 mounted above the water) ---
    /// Usable water column height in cm
    pub tank_height_cm: f32,
    /// Distance from the transducer face to the tank floor in cm
    pub sensor_to_bottom_cm: f32,
    /// Speed of sound, cm per microsecond (0.0343 at ~20 °C)
    pub speed_of_sound_cm_per_us: f32,
    /// Echo wait budget in microseconds, for both the rise and the fall
    pub echo_timeout_us: u32,

    // --- Climate (DHT single-wire) ---
    pub climate_sensor: DhtModel,
    /// Read attempts per cycle before falling back to the cached value
    pub climate_attempts: u8,
    /// Pause between attempts (milliseconds)
    pub climate_retry_delay_ms: u32,

    // --- Arbitration ---
    /// Extra moisture (percentage points) above the threshold before a
    /// session counts as recovered
    pub hysteresis_margin_pct: f32,
    /// Tank level (percent) at or below which the pump is forced off
    pub min_tank_pct: f32,

    // --- Pump ---
    /// Relay board energises on a LOW input
    pub pump_active_low: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            zone_id: Some(1),

            sample_interval_ms: 10_000,
            control_poll_ms: 100,

            soil_dry_adc: 3200.0,
            soil_wet_adc: 700.0,

            light_dark_adc: 3500.0,
            light_bright_adc: 500.0,

            tank_height_cm: 17.0,
            sensor_to_bottom_cm: 17.0,
            speed_of_sound_cm_per_us: 0.0343,
            echo_timeout_us: 30_000,

            climate_sensor: DhtModel::Dht11,
            climate_attempts: 3,
            climate_retry_delay_ms: 1000,

            hysteresis_margin_pct: 5.0,
            min_tank_pct: 5.0,

            pump_active_low: false,
        }
    }
}

impl NodeConfig {
    /// Parse a deployment document.  Missing fields take their defaults;
    /// an empty document yields [`NodeConfig::default`].
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        if doc.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the signal chain or the arbitration rules cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::Invalid("sample_interval_ms must be > 0"));
        }
        if self.control_poll_ms == 0 || self.control_poll_ms > self.sample_interval_ms {
            return Err(ConfigError::Invalid(
                "control_poll_ms must be > 0 and <= sample_interval_ms",
            ));
        }
        if !distinct(self.soil_dry_adc, self.soil_wet_adc) {
            return Err(ConfigError::Invalid("soil dry/wet ADC bounds must differ"));
        }
        if !distinct(self.light_dark_adc, self.light_bright_adc) {
            return Err(ConfigError::Invalid("light dark/bright ADC bounds must differ"));
        }
        if !(self.tank_height_cm > 0.0) || !(self.sensor_to_bottom_cm > 0.0) {
            return Err(ConfigError::Invalid("tank geometry must be positive"));
        }
        if !(self.speed_of_sound_cm_per_us > 0.0) || self.echo_timeout_us == 0 {
            return Err(ConfigError::Invalid("echo timing must be positive"));
        }
        if self.climate_attempts == 0 {
            return Err(ConfigError::Invalid("climate_attempts must be >= 1"));
        }
        if !(self.hysteresis_margin_pct >= 0.0) {
            return Err(ConfigError::Invalid("hysteresis_margin_pct must be >= 0"));
        }
        if !(0.0..100.0).contains(&self.min_tank_pct) {
            return Err(ConfigError::Invalid("min_tank_pct must be in [0, 100)"));
        }
        Ok(())
    }

    pub fn soil_calibration(&self) -> LinearMap {
        LinearMap::percent(self.soil_dry_adc, self.soil_wet_adc)
    }

    pub fn light_calibration(&self) -> LinearMap {
        LinearMap::percent(self.light_dark_adc, self.light_bright_adc)
    }

    pub fn tank_geometry(&self) -> TankGeometry {
        TankGeometry {
            tank_height_cm: self.tank_height_cm,
            sensor_to_bottom_cm: self.sensor_to_bottom_cm,
            speed_of_sound_cm_per_us: self.speed_of_sound_cm_per_us,
        }
    }

    pub fn tuning(&self) -> ArbitrationTuning {
        ArbitrationTuning {
            hysteresis_margin_pct: self.hysteresis_margin_pct,
            min_tank_pct: self.min_tank_pct,
        }
    }
}

fn distinct(a: f32, b: f32) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() > f32::EPSILON
}
