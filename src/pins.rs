//! GPIO / peripheral pin assignments for the AgroMind zone node.
//!
//! Single source of truth: the binary looks pins up here rather than
//! hard-coding numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output driving the pump relay module.  Polarity comes from
/// `NodeConfig::pump_active_low`.
pub const RELAY_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Sensors: Digital / Pulse
// ---------------------------------------------------------------------------

/// DHT11/DHT22 single-wire data line (open drain, external pull-up).
pub const DHT_GPIO: i32 = 4;

/// HC-SR04 trigger output.
pub const ULTRASONIC_TRIG_GPIO: i32 = 18;
/// HC-SR04 echo input (5 V module behind a divider).
pub const ULTRASONIC_ECHO_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// Capacitive soil-moisture probe.  ADC1 channel 6 (GPIO 34).
pub const SOIL_ADC_GPIO: i32 = 34;
pub const SOIL_ADC_CHANNEL: u32 = 6;

/// LDR divider.  ADC1 channel 7 (GPIO 35).
pub const LIGHT_ADC_GPIO: i32 = 35;
pub const LIGHT_ADC_CHANNEL: u32 = 7;

