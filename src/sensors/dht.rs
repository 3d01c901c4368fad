//! DHT11 / DHT22 single-wire climate sensor.
//!
//! ```text
//!  host   ‾‾‾\________/‾‾‾‾
//!  sensor                  \__80us__/‾‾80us‾‾\__50__/‾26|70‾\__50__/ ...
//!                            response           bit 0..39
//! ```
//!
//! The host holds the line low to wake the sensor, then releases it.  The
//! sensor answers with an 80 µs low / 80 µs high preamble followed by 40
//! bits, each a 50 µs low and a high whose width encodes the bit (≈26 µs
//! for 0, ≈70 µs for 1).  The last byte is the 8-bit sum of the first four.
//!
//! Frame decoding runs inside a critical section so an interrupt cannot
//! stretch a measured high period across the 0/1 threshold.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ClimateSensor;
use super::pulse::{MicrosClock, PulseError, wait_for_level};
use crate::error::{DhtPhase, SensorError};

/// Budget for every individual wait in the frame.
pub const PHASE_TIMEOUT_US: u32 = 1000;
/// High periods longer than this decode as a 1 bit.
pub const BIT_ONE_THRESHOLD_US: u32 = 40;

/// Sensor variant.  Governs the wake pulse and the frame layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DhtModel {
    Dht11,
    Dht22,
}

impl DhtModel {
    /// How long the host holds the line low to wake the sensor.
    pub fn start_low_ms(self) -> u32 {
        match self {
            Self::Dht11 => 20,
            Self::Dht22 => 2,
        }
    }

    /// Decode a checksum-verified frame.
    pub fn decode(self, frame: [u8; 5]) -> ClimateSample {
        let [b0, b1, b2, b3, _] = frame;
        match self {
            Self::Dht11 => {
                let humidity = f32::from(b0) + f32::from(b1) * 0.1;
                let mut temperature = f32::from(b2 & 0x7F) + f32::from(b3 & 0x0F) * 0.1;
                if b2 & 0x80 != 0 || b3 & 0x80 != 0 {
                    temperature = -temperature;
                }
                ClimateSample {
                    temperature_c: temperature,
                    humidity_pct: humidity,
                }
            }
            Self::Dht22 => {
                let humidity = f32::from(u16::from_be_bytes([b0, b1])) / 10.0;
                let magnitude = f32::from(u16::from_be_bytes([b2 & 0x7F, b3])) / 10.0;
                let temperature = if b2 & 0x80 != 0 { -magnitude } else { magnitude };
                ClimateSample {
                    temperature_c: temperature,
                    humidity_pct: humidity,
                }
            }
        }
    }
}

/// One decoded climate reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Low byte of the sum of the first four frame bytes.
pub fn checksum(frame: &[u8; 5]) -> u8 {
    frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// DHT driver over one open-drain data line.
pub struct Dht<P, C, D> {
    pin: P,
    clock: C,
    delay: D,
    model: DhtModel,
    attempts: u8,
    retry_delay_ms: u32,
}

impl<P, C, D> Dht<P, C, D>
where
    P: InputPin + OutputPin,
    C: MicrosClock,
    D: DelayNs,
{
    pub fn new(pin: P, clock: C, delay: D, model: DhtModel) -> Self {
        Self {
            pin,
            clock,
            delay,
            model,
            attempts: 3,
            retry_delay_ms: 1000,
        }
    }

    /// Override the retry policy used by [`read_with_retry`](Self::read_with_retry).
    pub fn with_retry(mut self, attempts: u8, retry_delay_ms: u32) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// One wake / response / 40-bit exchange.
    pub fn read(&mut self) -> Result<ClimateSample, SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_ms(self.model.start_low_ms());
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)?;

        let Self { pin, clock, .. } = self;
        let frame = critical_section::with(|_| read_frame(pin, clock))?;

        let expected = checksum(&frame);
        if expected != frame[4] {
            return Err(SensorError::DhtChecksum {
                expected,
                received: frame[4],
            });
        }
        debug!("DHT frame {:02x?}", frame);
        Ok(self.model.decode(frame))
    }

    /// [`read`](Self::read) up to `attempts` times, pausing between tries.
    /// Returns the last error when every attempt fails.
    pub fn read_with_retry(&mut self) -> Result<ClimateSample, SensorError> {
        let mut attempt = 1;
        loop {
            match self.read() {
                Ok(sample) => return Ok(sample),
                Err(e) if attempt >= self.attempts => return Err(e),
                Err(e) => {
                    warn!("DHT read {}/{} failed: {}", attempt, self.attempts, e);
                    attempt += 1;
                    self.delay.delay_ms(self.retry_delay_ms);
                }
            }
        }
    }
}

impl<P, C, D> ClimateSensor for Dht<P, C, D>
where
    P: InputPin + OutputPin,
    C: MicrosClock,
    D: DelayNs,
{
    fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        self.read_with_retry()
    }
}

fn read_frame<P: InputPin, C: MicrosClock>(pin: &mut P, clock: &C) -> Result<[u8; 5], SensorError> {
    wait(pin, clock, PinState::Low, DhtPhase::ResponseLow)?;
    wait(pin, clock, PinState::High, DhtPhase::ResponseHigh)?;
    wait(pin, clock, PinState::Low, DhtPhase::DataStart)?;

    let mut frame = [0u8; 5];
    for bit in 0..40u8 {
        wait(pin, clock, PinState::High, DhtPhase::BitLow(bit))?;
        let high_us = wait(pin, clock, PinState::Low, DhtPhase::BitHigh(bit))?;
        let byte = &mut frame[usize::from(bit / 8)];
        *byte <<= 1;
        if high_us > BIT_ONE_THRESHOLD_US {
            *byte |= 1;
        }
    }
    Ok(frame)
}

fn wait<P: InputPin, C: MicrosClock>(
    pin: &mut P,
    clock: &C,
    level: PinState,
    phase: DhtPhase,
) -> Result<u32, SensorError> {
    wait_for_level(pin, level, PHASE_TIMEOUT_US, clock).map_err(|e| match e {
        PulseError::Timeout => SensorError::DhtTimeout(phase),
        PulseError::Gpio => SensorError::GpioFailed,
    })
}
