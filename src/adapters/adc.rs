//! ADC1 oneshot adapter.
//!
//! Configures ADC1 through the raw ESP-IDF oneshot API and hands out one
//! [`Adc1Channel`] per analog input, each implementing [`AdcChannel`].
//! 12 dB attenuation (full 0 – 3.3 V range), 12-bit width.

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;
use log::info;

use crate::error::{Error, SensorError};
use crate::sensors::AdcChannel;

/// The ADC1 oneshot unit.  Created once at boot and never torn down, so
/// channel handles stay valid for the life of the program.
pub struct Adc1 {
    #[cfg(target_os = "espidf")]
    handle: adc_oneshot_unit_handle_t,
}

/// One configured ADC1 input.
pub struct Adc1Channel {
    #[cfg(target_os = "espidf")]
    handle: adc_oneshot_unit_handle_t,
    channel: u32,
}

impl Adc1Channel {
    pub fn channel(&self) -> u32 {
        self.channel
    }
}

#[cfg(target_os = "espidf")]
impl Adc1 {
    pub fn new() -> Result<Self, Error> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: called once from main() before the control loop starts.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("ADC1 unit init failed"));
        }
        info!("adc: ADC1 oneshot unit ready");
        Ok(Self { handle })
    }

    /// Configure `channel` and return a reader for it.
    pub fn channel(&self, channel: u32) -> Result<Adc1Channel, Error> {
        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        // SAFETY: `self.handle` came from adc_oneshot_new_unit and is never freed.
        let ret = unsafe { adc_oneshot_config_channel(self.handle, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("ADC1 channel config failed"));
        }
        info!("adc: ADC1 CH{} configured (12 dB, 12-bit)", channel);
        Ok(Adc1Channel {
            handle: self.handle,
            channel,
        })
    }
}

#[cfg(target_os = "espidf")]
impl AdcChannel for Adc1Channel {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        // SAFETY: single-threaded control-loop access; the unit outlives every channel.
        let ret = unsafe { adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.clamp(0, 4095) as u16)
    }
}

// ── Host build: no ADC ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl Adc1 {
    pub fn new() -> Result<Self, Error> {
        info!("adc(sim): ADC1 not available on host");
        Ok(Self {})
    }

    pub fn channel(&self, channel: u32) -> Result<Adc1Channel, Error> {
        Ok(Adc1Channel { channel })
    }
}

#[cfg(not(target_os = "espidf"))]
impl AdcChannel for Adc1Channel {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        Err(SensorError::AdcReadFailed)
    }
}
