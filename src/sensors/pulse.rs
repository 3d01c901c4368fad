//! Bounded busy-waits for bit-banged pulse protocols.
//!
//! Every wait either observes the requested line level or expires on its
//! own fixed timeout.  The outcome is `Ok(elapsed_us)` or a [`PulseError`].

use embedded_hal::digital::{InputPin, PinState};

/// Free-running microsecond counter (ESP32: `esp_timer_get_time`).
pub trait MicrosClock {
    fn now_us(&self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseError {
    /// The line did not reach the requested level within the budget.
    Timeout,
    /// The GPIO read itself failed.
    Gpio,
}

/// Spin until `pin` reads `level`, for at most `timeout_us`.
///
/// Returns the microseconds spent waiting, i.e. how long the line stayed at
/// the opposite level.  Callers measure a pulse width by first waiting for
/// its leading edge, then timing the wait for its trailing edge.
pub fn wait_for_level<P, C>(
    pin: &mut P,
    level: PinState,
    timeout_us: u32,
    clock: &C,
) -> Result<u32, PulseError>
where
    P: InputPin,
    C: MicrosClock,
{
    let start = clock.now_us();
    loop {
        let elapsed = clock.now_us().saturating_sub(start);
        let high = pin.is_high().map_err(|_| PulseError::Gpio)?;
        if PinState::from(high) == level {
            return Ok(u32::try_from(elapsed).unwrap_or(u32::MAX));
        }
        if elapsed > u64::from(timeout_us) {
            return Err(PulseError::Timeout);
        }
    }
}
