//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                 |
//! |---------------|---------------------|-----------------------------|
//! | `adc`         | AdcChannel          | ESP32 ADC1 oneshot          |
//! | `hardware`    | SensorPort          | DHT, HC-SR04, ADC channels  |
//! |               | PumpPort            | Relay GPIO                  |
//! | `http_uplink` | UplinkPort          | Backend REST endpoint       |
//! | `log_sink`    | EventSink           | Serial log output           |
//! | `time`        | MicrosClock         | ESP32 system timer          |
//! | `wifi`        | ConnectivityPort    | ESP-IDF WiFi STA            |

pub mod adc;
pub mod hardware;
pub mod http_uplink;
pub mod log_sink;
pub mod time;
pub mod wifi;
