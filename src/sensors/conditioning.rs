//! Raw samples → calibrated readings.
//!
//! Applies the deployment calibration to one [`RawSample`] and records the
//! results in the [`ReadingCache`].  Channels that failed acquisition are
//! reported back as faults and leave their cached value untouched, with one
//! exception: the tank gauge reports a missing echo as an empty tank.

use heapless::Vec;
use log::debug;

use super::RawSample;
use super::calibration::LinearMap;
use super::ultrasonic::{TankGeometry, read_water_level};
use crate::config::NodeConfig;
use crate::error::SensorError;
use crate::fsm::context::ReadingCache;

/// Which physical input a fault came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Climate,
    Soil,
    Light,
    Tank,
}

/// Per-cycle acquisition failures, at most one per channel.
pub type CycleFaults = Vec<(SensorChannel, SensorError), 4>;

pub struct SignalConditioner {
    soil: LinearMap,
    light: LinearMap,
    tank: TankGeometry,
}

impl SignalConditioner {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            soil: config.soil_calibration(),
            light: config.light_calibration(),
            tank: config.tank_geometry(),
        }
    }

    pub fn condition(&self, raw: &RawSample, cache: &mut ReadingCache, now_ms: u64) -> CycleFaults {
        let mut faults = CycleFaults::new();

        match raw.climate {
            Ok(s) => cache.record_climate(s.temperature_c, s.humidity_pct),
            Err(e) => push(&mut faults, SensorChannel::Climate, e),
        }
        match raw.soil_adc {
            Ok(adc) => cache.record_soil(self.soil.apply(f32::from(adc))),
            Err(e) => push(&mut faults, SensorChannel::Soil, e),
        }
        match raw.light_adc {
            Ok(adc) => cache.record_light(self.light.apply(f32::from(adc))),
            Err(e) => push(&mut faults, SensorChannel::Light, e),
        }
        if let Err(e) = raw.echo_us {
            push(&mut faults, SensorChannel::Tank, e);
        }
        cache.record_tank(read_water_level(raw.echo_us, &self.tank));
        cache.stamp(now_ms);

        let r = cache.latest();
        debug!(
            "Readings: T={:.1}C RH={:.1}% soil={:.1}% tank={:.1}% light={:.1}%",
            r.temperature_c, r.ambient_humidity_pct, r.soil_moisture_pct, r.tank_level_pct, r.light_pct
        );
        faults
    }
}

fn push(faults: &mut CycleFaults, channel: SensorChannel, e: SensorError) {
    // One entry per channel: capacity is never exceeded.
    let _ = faults.push((channel, e));
}
