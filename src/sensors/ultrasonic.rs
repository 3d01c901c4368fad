//! HC-SR04 ultrasonic tank gauge.
//!
//! The transducer is mounted above the water, looking down.  Echo round
//! trip time gives the distance to the surface; the water column is what
//! is left of the sensor-to-floor distance.
//!
//! ```text
//!   ┌─[HC-SR04]─┐  ─┬─
//!   │           │   │ distance (echo)
//!   │~~~~~~~~~~~│  ─┼─
//!   │   water   │   │ water height
//!   └───────────┘  ─┴─  sensor_to_bottom = distance + height
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;
use serde::{Deserialize, Serialize};

use super::RangeFinder;
use super::pulse::{MicrosClock, PulseError, wait_for_level};
use crate::error::SensorError;

/// Trigger pulse: line settled LOW, then HIGH for at least 10 µs.
const TRIGGER_SETTLE_US: u32 = 2;
const TRIGGER_PULSE_US: u32 = 10;

/// Tank geometry and acoustic constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankGeometry {
    pub tank_height_cm: f32,
    pub sensor_to_bottom_cm: f32,
    pub speed_of_sound_cm_per_us: f32,
}

impl TankGeometry {
    /// One-way distance for an echo round trip.
    pub fn echo_distance_cm(&self, duration_us: u32) -> f32 {
        duration_us as f32 * self.speed_of_sound_cm_per_us / 2.0
    }

    /// Fill level in percent for a measured surface distance.
    ///
    /// The distance is clamped to `[0, sensor_to_bottom]` first, so echoes
    /// off the floor or from inside the dead zone cannot produce levels
    /// outside 0–100 %.
    pub fn fill_pct(&self, distance_cm: f32) -> f32 {
        let distance = if distance_cm.is_nan() {
            self.sensor_to_bottom_cm
        } else {
            distance_cm.clamp(0.0, self.sensor_to_bottom_cm)
        };
        let water_cm = self.sensor_to_bottom_cm - distance;
        (water_cm / self.tank_height_cm * 100.0).clamp(0.0, 100.0)
    }
}

/// Convert an echo measurement into a tank level.
///
/// A missing echo reads as an empty tank (0 %): the interlock then keeps
/// the pump off until the gauge answers again.
pub fn read_water_level(echo: Result<u32, SensorError>, geometry: &TankGeometry) -> f32 {
    match echo {
        Ok(us) => geometry.fill_pct(geometry.echo_distance_cm(us)),
        Err(e) => {
            warn!("Tank gauge: {e}, reporting 0%");
            0.0
        }
    }
}

/// HC-SR04 driver over a trigger output and an echo input.
pub struct HcSr04<T, E, C, D> {
    trig: T,
    echo: E,
    clock: C,
    delay: D,
    timeout_us: u32,
}

impl<T, E, C, D> HcSr04<T, E, C, D>
where
    T: OutputPin,
    E: InputPin,
    C: MicrosClock,
    D: DelayNs,
{
    /// `timeout_us` bounds both the wait for the echo to rise and the wait
    /// for it to fall.
    pub fn new(trig: T, echo: E, clock: C, delay: D, timeout_us: u32) -> Self {
        Self {
            trig,
            echo,
            clock,
            delay,
            timeout_us,
        }
    }

    /// Fire one ping and return the echo pulse width in microseconds.
    ///
    /// No rising edge within the budget is [`SensorError::EchoTimeout`].  An
    /// echo that never falls is truncated at the budget: the surface is
    /// beyond range, which the geometry clamps to an empty tank anyway.
    pub fn measure_echo_us(&mut self) -> Result<u32, SensorError> {
        let Self { trig, delay, .. } = self;
        critical_section::with(|_| -> Result<(), SensorError> {
            trig.set_low().map_err(|_| SensorError::GpioFailed)?;
            delay.delay_us(TRIGGER_SETTLE_US);
            trig.set_high().map_err(|_| SensorError::GpioFailed)?;
            delay.delay_us(TRIGGER_PULSE_US);
            trig.set_low().map_err(|_| SensorError::GpioFailed)
        })?;

        match wait_for_level(&mut self.echo, PinState::High, self.timeout_us, &self.clock) {
            Ok(_) => {}
            Err(PulseError::Timeout) => return Err(SensorError::EchoTimeout),
            Err(PulseError::Gpio) => return Err(SensorError::GpioFailed),
        }

        match wait_for_level(&mut self.echo, PinState::Low, self.timeout_us, &self.clock) {
            Ok(width) => Ok(width),
            Err(PulseError::Timeout) => {
                warn!("Echo held high past {}us, truncating", self.timeout_us);
                Ok(self.timeout_us)
            }
            Err(PulseError::Gpio) => Err(SensorError::GpioFailed),
        }
    }
}

impl<T, E, C, D> RangeFinder for HcSr04<T, E, C, D>
where
    T: OutputPin,
    E: InputPin,
    C: MicrosClock,
    D: DelayNs,
{
    fn echo_us(&mut self) -> Result<u32, SensorError> {
        self.measure_echo_us()
    }
}
