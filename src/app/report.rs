//! Outbound sensor report.
//!
//! ```json
//! { "zoneId": 1,
//!   "sensors": { "temperature": 24.1, "ambientHumidity": 58.0,
//!                "soilMoisture": 31.2, "waterLevel": 64.7,
//!                "lightLevel": 80.3, "pumpStatus": false } }
//! ```

use serde::{Deserialize, Serialize};

use crate::fsm::context::CalibratedReading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReport {
    pub zone_id: u32,
    pub sensors: ReportedSensors,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedSensors {
    pub temperature: f32,
    pub ambient_humidity: f32,
    pub soil_moisture: f32,
    pub water_level: f32,
    pub light_level: f32,
    pub pump_status: bool,
}

impl SensorReport {
    pub fn new(zone_id: u32, reading: &CalibratedReading, pump_on: bool) -> Self {
        Self {
            zone_id,
            sensors: ReportedSensors {
                temperature: reading.temperature_c,
                ambient_humidity: reading.ambient_humidity_pct,
                soil_moisture: reading.soil_moisture_pct,
                water_level: reading.tank_level_pct,
                light_level: reading.light_pct,
                pump_status: pump_on,
            },
        }
    }

    /// Serialise into `buf`, returning the used prefix.
    pub fn write_json<'a>(&self, buf: &'a mut [u8]) -> Option<&'a [u8]> {
        let mut cursor = std::io::Cursor::new(buf);
        serde_json::to_writer(&mut cursor, self).ok()?;
        let len = cursor.position() as usize;
        let written: &'a [u8] = cursor.into_inner();
        written.get(..len)
    }
}
