//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the pump relay, exposing them through
//! [`SensorPort`] and [`PumpPort`].  This is the only module in the system
//! that touches actual hardware.  Both halves are generic over
//! `embedded-hal` traits, so host tests drive the same adapter with
//! simulated pins.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{PumpPort, SensorPort};
use crate::drivers::pump::RelayPump;
use crate::sensors::{AdcChannel, ClimateSensor, RangeFinder, RawSample, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<C, R, S, L, P> {
    sensor_hub: SensorHub<C, R, S, L>,
    pump: RelayPump<P>,
}

impl<C, R, S, L, P> HardwareAdapter<C, R, S, L, P> {
    pub fn new(sensor_hub: SensorHub<C, R, S, L>, pump: RelayPump<P>) -> Self {
        Self { sensor_hub, pump }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<C, R, S, L, P> SensorPort for HardwareAdapter<C, R, S, L, P>
where
    C: ClimateSensor,
    R: RangeFinder,
    S: AdcChannel,
    L: AdcChannel,
{
    fn sample(&mut self) -> RawSample {
        self.sensor_hub.sample()
    }
}

// ── PumpPort implementation ───────────────────────────────────

impl<C, R, S, L, P: OutputPin> PumpPort for HardwareAdapter<C, R, S, L, P> {
    fn set_pump(&mut self, on: bool) -> bool {
        self.pump.set(on)
    }

    fn is_pump_on(&self) -> bool {
        self.pump.is_on()
    }
}
