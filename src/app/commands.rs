//! Inbound commands from the backend.
//!
//! The backend answers every report with a JSON object:
//!
//! ```json
//! { "commands": { "autoMode": true, "moistureThreshold": 35,
//!                 "wateringDuration": 20, "tankLocked": false,
//!                 "pumpState": null } }
//! ```
//!
//! or, from older backends, `{ "pumpCommand": true }`.  Every field is
//! optional and a field holding the wrong JSON type reads as absent; only
//! a body that is not a JSON object at all is rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::UplinkError;

/// Parsed response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundMessage {
    #[serde(deserialize_with = "lenient_object")]
    pub commands: Option<ZoneCommands>,
    /// Legacy single pump command.
    #[serde(deserialize_with = "lenient")]
    pub pump_command: Option<bool>,
}

/// Structured command object.  `None` means "not sent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneCommands {
    #[serde(deserialize_with = "lenient")]
    pub auto_mode: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub moisture_threshold: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub watering_duration: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub tank_locked: Option<bool>,
    /// `null` and absent both mean "let autonomous control decide".
    #[serde(deserialize_with = "lenient")]
    pub pump_state: Option<bool>,
}

impl InboundMessage {
    /// Parse a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, UplinkError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| UplinkError::Malformed)?;
        if !value.is_object() {
            return Err(UplinkError::Malformed);
        }
        Self::deserialize(value).map_err(|_| UplinkError::Malformed)
    }

    /// A message carrying nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.commands.is_none() && self.pump_command.is_none()
    }
}

impl ZoneCommands {
    /// Threshold if it is usable (finite and > 0).
    pub fn valid_threshold(&self) -> Option<f32> {
        self.moisture_threshold.filter(|t| t.is_finite() && *t > 0.0)
    }

    /// Duration in whole seconds, floored to at least 1.
    pub fn valid_duration_secs(&self) -> Option<u32> {
        let d = self.watering_duration.filter(|d| d.is_finite())?;
        Some((d.trunc() as u32).max(1))
    }
}

/// Deserialize `T`, mapping a value of the wrong shape (including `null`)
/// to `None` instead of failing the whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// [`lenient`] for nested objects: anything but a JSON object is `None`.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(T::deserialize(value).ok())
}
