//! Pump relay driver.
//!
//! One digital output switching the pump relay.  Relay boards differ in
//! which input level energises the coil; that polarity is a single
//! constructor flag and nothing outside this module knows about it.
//!
//! ## Safety contract
//!
//! The pump must never run while the tank is locked or low.  Enforced by
//! the tank interlock and the arbitration rules; this driver is a dumb
//! actuator.
//!
//! ## Idempotence
//!
//! `set(on)` always re-drives the line, so a call with the current state
//! repairs a line left indeterminate at boot, but only a real change is
//! reported (and logged) as a transition.

use embedded_hal::digital::OutputPin;
use log::{debug, error, info};

use crate::app::ports::PumpPort;

/// Logical pump state.  The single source of truth for "is the pump on".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpState {
    pub is_on: bool,
}

pub struct RelayPump<P> {
    pin: P,
    active_low: bool,
    state: PumpState,
}

impl<P: OutputPin> RelayPump<P> {
    /// Take the relay pin and immediately drive it to the off level.
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut pump = Self {
            pin,
            active_low,
            state: PumpState::default(),
        };
        pump.drive();
        pump
    }

    /// Set the logical state and re-drive the output.  Returns `true` when
    /// the logical state changed.
    pub fn set(&mut self, on: bool) -> bool {
        let changed = self.state.is_on != on;
        self.state.is_on = on;
        self.drive();
        if changed {
            info!("Pump {}", if on { "ON" } else { "OFF" });
        } else {
            debug!("Pump re-asserted {}", if on { "ON" } else { "OFF" });
        }
        changed
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on
    }

    /// Physical line level for the current logical state.
    fn line_high(&self) -> bool {
        self.state.is_on != self.active_low
    }

    fn drive(&mut self) {
        let result = if self.line_high() {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            error!("Pump relay GPIO write failed");
        }
    }
}

impl<P: OutputPin> PumpPort for RelayPump<P> {
    fn set_pump(&mut self, on: bool) -> bool {
        self.set(on)
    }

    fn is_pump_on(&self) -> bool {
        self.is_on()
    }
}
