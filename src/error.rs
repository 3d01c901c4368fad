//! Unified error types for the AgroMind node firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! boot path's error handling uniform.  All variants are `Copy` so they can
//! be carried inside events and sensor results without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned invalid data.
    Sensor(SensorError),
    /// Deployment configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// The backend exchange failed.
    Uplink(UplinkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Uplink(e) => write!(f, "uplink: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Phase of the single-wire climate protocol in which a wait expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtPhase {
    /// Sensor never pulled the line low after the host released it.
    ResponseLow,
    /// Sensor never released its response low pulse.
    ResponseHigh,
    /// Sensor never started the first data bit.
    DataStart,
    /// The low half of data bit `n` never ended.
    BitLow(u8),
    /// The high half of data bit `n` never ended.
    BitHigh(u8),
}

impl fmt::Display for DhtPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResponseLow => write!(f, "response low"),
            Self::ResponseHigh => write!(f, "response high"),
            Self::DataStart => write!(f, "data start"),
            Self::BitLow(n) => write!(f, "bit {n} low"),
            Self::BitHigh(n) => write!(f, "bit {n} high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read or write returned an error.
    GpioFailed,
    /// Ultrasonic echo never rose within the timeout window.
    EchoTimeout,
    /// Single-wire climate sensor stopped responding mid-frame.
    DhtTimeout(DhtPhase),
    /// Single-wire frame checksum did not match.
    DhtChecksum { expected: u8, received: u8 },
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::EchoTimeout => write!(f, "no ultrasonic echo"),
            Self::DhtTimeout(phase) => write!(f, "DHT timeout in {phase}"),
            Self::DhtChecksum { expected, received } => write!(
                f,
                "DHT checksum mismatch (expected 0x{expected:02x}, got 0x{received:02x})"
            ),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for [`NodeConfig`](crate::config::NodeConfig).
    Malformed,
    /// A field failed range validation.  Names the field and the rule.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed configuration document"),
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Uplink errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkError {
    /// Request could not be sent (socket, TLS, DNS).
    Transport,
    /// Backend answered with a non-success status code.
    Status(u16),
    /// Request or response body did not fit its buffer.
    BodyTooLarge,
    /// Response body was not a command object.
    Malformed,
}

impl fmt::Display for UplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failure"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::BodyTooLarge => write!(f, "body exceeds buffer"),
            Self::Malformed => write!(f, "malformed response"),
        }
    }
}

impl From<UplinkError> for Error {
    fn from(e: UplinkError) -> Self {
        Self::Uplink(e)
    }
}

