//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! Drivers are generic over `embedded-hal` pins and a [`MicrosClock`], so
//! the same code runs against ESP-IDF GPIO on target and against scripted
//! waveforms in host tests.  The hub reads every channel once per cycle and
//! hands back a [`RawSample`] in which each channel carries its own
//! outcome; [`conditioning`] turns that into calibrated readings.
//!
//! [`MicrosClock`]: pulse::MicrosClock

pub mod calibration;
pub mod conditioning;
pub mod dht;
pub mod pulse;
pub mod ultrasonic;

use crate::error::SensorError;
use dht::ClimateSample;

/// Temperature / humidity source.
pub trait ClimateSensor {
    fn read_climate(&mut self) -> Result<ClimateSample, SensorError>;
}

/// Echo-timing distance source.
pub trait RangeFinder {
    /// Round-trip echo width in microseconds.
    fn echo_us(&mut self) -> Result<u32, SensorError>;
}

/// One 12-bit ADC input.
pub trait AdcChannel {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Everything one acquisition cycle produced, before calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub climate: Result<ClimateSample, SensorError>,
    pub soil_adc: Result<u16, SensorError>,
    pub light_adc: Result<u16, SensorError>,
    pub echo_us: Result<u32, SensorError>,
}

/// Owns the four sensor channels of a zone node.
pub struct SensorHub<C, R, S, L> {
    pub climate: C,
    pub tank: R,
    pub soil: S,
    pub light: L,
}

impl<C, R, S, L> SensorHub<C, R, S, L>
where
    C: ClimateSensor,
    R: RangeFinder,
    S: AdcChannel,
    L: AdcChannel,
{
    pub fn new(climate: C, tank: R, soil: S, light: L) -> Self {
        Self {
            climate,
            tank,
            soil,
            light,
        }
    }

    /// Read every channel once.  A failing channel never stops the others.
    pub fn sample(&mut self) -> RawSample {
        RawSample {
            climate: self.climate.read_climate(),
            soil_adc: self.soil.read_raw(),
            light_adc: self.light.read_raw(),
            echo_us: self.tank.echo_us(),
        }
    }
}
