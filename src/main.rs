//! AgroMind zone node: main entry point.
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink    HttpUplink   Esp32Time   │
//! │  (Sensor+Pump ports)  (EventSink)     (Uplink)     (clock)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  Conditioning · Engine · Rules · Reconciler            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::prelude::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use agromind::adapters::adc::Adc1;
use agromind::adapters::hardware::HardwareAdapter;
use agromind::adapters::http_uplink::{EspHttpPost, HttpUplink};
use agromind::adapters::log_sink::LogEventSink;
use agromind::adapters::time::Esp32TimeAdapter;
use agromind::adapters::wifi::{ConnectivityPort, WifiAdapter};
use agromind::app::service::NodeService;
use agromind::config::NodeConfig;
use agromind::drivers::pump::RelayPump;
use agromind::error::Error;
use agromind::pins;
use agromind::sensors::SensorHub;
use agromind::sensors::dht::Dht;
use agromind::sensors::ultrasonic::HcSr04;

/// Deployment document copied in by `build.rs` (empty unless
/// `AGROMIND_NODE_CONFIG` was set at build time).
const NODE_CONFIG_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/node_config.json"));

const DEFAULT_UPLINK_URL: &str = "http://192.168.1.100:3000/api/iot/sensor-data";

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AgroMind node v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Deployment configuration ───────────────────────────
    let config = NodeConfig::from_json(NODE_CONFIG_JSON).map_err(Error::from)?;
    info!(
        "Config: zone={:?} sample={}ms poll={}ms sensor={:?}",
        config.zone_id, config.sample_interval_ms, config.control_poll_ms, config.climate_sensor
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let clock = Esp32TimeAdapter::new();

    info!(
        "Pins: relay={} dht={} trig={} echo={} soil={} light={}",
        pins::RELAY_GPIO,
        pins::DHT_GPIO,
        pins::ULTRASONIC_TRIG_GPIO,
        pins::ULTRASONIC_ECHO_GPIO,
        pins::SOIL_ADC_GPIO,
        pins::LIGHT_ADC_GPIO,
    );

    // SAFETY: each GPIO number in `pins` is claimed by exactly one driver
    // below, and `peripherals.pins` is never touched.
    let (relay_pin, dht_pin, trig_pin, echo_pin) = unsafe {
        (
            AnyOutputPin::new(pins::RELAY_GPIO),
            AnyIOPin::new(pins::DHT_GPIO),
            AnyOutputPin::new(pins::ULTRASONIC_TRIG_GPIO),
            AnyInputPin::new(pins::ULTRASONIC_ECHO_GPIO),
        )
    };

    let relay = PinDriver::output(relay_pin)?;
    let pump = RelayPump::new(relay, config.pump_active_low);

    let dht_line = PinDriver::input_output_od(dht_pin)?;
    let climate = Dht::new(dht_line, clock, Delay::new_default(), config.climate_sensor)
        .with_retry(config.climate_attempts, config.climate_retry_delay_ms);

    let trig = PinDriver::output(trig_pin)?;
    let echo = PinDriver::input(echo_pin)?;
    let tank = HcSr04::new(trig, echo, clock, Delay::new_default(), config.echo_timeout_us);

    let adc = Adc1::new()?;
    let soil = adc.channel(pins::SOIL_ADC_CHANNEL)?;
    let light = adc.channel(pins::LIGHT_ADC_CHANNEL)?;

    let mut hw = HardwareAdapter::new(SensorHub::new(climate, tank, soil, light), pump);
    let mut log_sink = LogEventSink::new();

    // ── 4. Network ────────────────────────────────────────────
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sysloop)?);
    match option_env!("WIFI_SSID") {
        Some(ssid) => {
            let password = option_env!("WIFI_PASS").unwrap_or("");
            if let Err(e) = wifi.set_credentials(ssid, password) {
                warn!("WiFi credentials rejected: {}", e);
            } else if let Err(e) = wifi.connect() {
                warn!("WiFi: {} (reports suppressed until connected)", e);
            }
        }
        None => warn!("WIFI_SSID not set at build time, running offline"),
    }

    let url = option_env!("UPLINK_URL").unwrap_or(DEFAULT_UPLINK_URL);
    let mut uplink = HttpUplink::new(wifi, EspHttpPost, url).map_err(Error::from)?;
    info!("Uplink: {}", url);

    // ── 5. App service ────────────────────────────────────────
    let mut app = NodeService::new(&config);
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let sample_interval_ms = u64::from(config.sample_interval_ms);
    let mut next_sample_ms = 0;

    loop {
        let now_ms = clock.uptime_ms();
        uplink.link_mut().poll(now_ms);

        if now_ms >= next_sample_ms {
            app.tick(&mut hw, now_ms, &mut log_sink);
            app.sync(&mut uplink, &mut hw, clock.uptime_ms(), &mut log_sink);
            next_sample_ms = now_ms + sample_interval_ms;
        } else {
            app.poll(&mut hw, now_ms, &mut log_sink);
        }

        FreeRtos::delay_ms(config.control_poll_ms);
    }
}
