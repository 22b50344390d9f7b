//! Croquinator Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FeederHardware      LogEventSink   NvsAdapter   SystemClock   │
//! │  (Presence+Dispense) (EventSink)    (Storage)    (ClockPort)   │
//! │  WifiAdapter         HTTP server    ButtonDriver  Watchdog     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        AppService → FeedingScheduler (pure logic)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_svc::hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use croquinator::adapters::hardware::FeederHardware;
use croquinator::adapters::log_sink::LogEventSink;
use croquinator::adapters::nvs::NvsAdapter;
use croquinator::adapters::time::SystemClock;
use croquinator::adapters::wifi::{WifiAdapter, BUILD_PASSWORD, BUILD_SSID};
use croquinator::adapters::http_server;
use croquinator::app::feeder::Feeder;
use croquinator::app::ports::ClockPort;
use croquinator::app::service::AppService;
use croquinator::clock::MidnightWatch;
use croquinator::config::FeederConfig;
use croquinator::drivers::button::ButtonDriver;
use croquinator::drivers::presence::PresenceSensor;
use croquinator::drivers::valve::ServoValve;
use croquinator::drivers::watchdog::Watchdog;
use croquinator::error::Error;
use croquinator::events::{self, push_event, Event};
use croquinator::pins;

/// Button sampling period; also the loop's idle sleep.
const BUTTON_POLL_MS: u32 = 10;

fn uptime_ms() -> u32 {
    // SAFETY: reads the monotonic high-resolution timer; no side effects.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u32
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Croquinator v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = FeederConfig::default();
    config.validate().map_err(Error::from)?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Storage ────────────────────────────────────────────
    let store = NvsAdapter::new().map_err(Error::from)?;

    // ── 3. Feeder hardware ────────────────────────────────────
    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new()
            .frequency(Hertz(pins::SERVO_PWM_FREQ_HZ))
            .resolution(Resolution::Bits14),
    )?;
    // SAFETY: each GPIO number in `pins` is claimed exactly once.
    let servo_pin = unsafe { AnyOutputPin::new(pins::SERVO_GPIO) };
    let servo = LedcDriver::new(peripherals.ledc.channel0, timer, servo_pin)?;

    let mut ir = PinDriver::input(unsafe { AnyIOPin::new(pins::IR_SENSOR_GPIO) })?;
    ir.set_pull(Pull::Up)?;

    let mut button_pin = PinDriver::input(unsafe { AnyIOPin::new(pins::BUTTON_GPIO) })?;
    button_pin.set_pull(Pull::Up)?;
    let mut button = ButtonDriver::new(button_pin);

    let hw = FeederHardware::new(PresenceSensor::new(ir), ServoValve::new(servo, FreeRtos));

    // ── 4. Network + clock ────────────────────────────────────
    let mut clock = SystemClock::new(config.utc_offset_secs, &config.ntp_server);
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, Some(nvs_partition)).map_err(Error::from)?;
    match (BUILD_SSID, BUILD_PASSWORD) {
        (Some(ssid), password) => match wifi.connect(ssid, password.unwrap_or("")) {
            Ok(()) => {
                if !clock.resync() {
                    warn!("Clock: initial sync failed, feeding on unsynced time");
                }
            }
            Err(e) => warn!("WiFi: {} (running offline)", e),
        },
        (None, _) => warn!("WiFi: no credentials built in (running offline)"),
    }

    // ── 5. Application ────────────────────────────────────────
    let tick_ms = config.control_loop_interval_ms;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    let mut feeder = Feeder::new(AppService::new(config), hw, clock, store, LogEventSink::new());
    feeder.start();
    let mut was_synced = feeder.clock.is_synced();
    let feeder = Arc::new(Mutex::new(feeder));

    let _server = match http_server::start(feeder.clone()) {
        Ok(server) => Some(server),
        Err(e) => {
            warn!("HTTP: {} (web interface disabled)", e);
            None
        }
    };

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    // Unsynced clocks still roll over daily; only the sync jump is skipped.
    let mut midnight = MidnightWatch::new();
    let mut last_tick_ms = uptime_ms();

    loop {
        let now_ms = uptime_ms();

        if let Some(gesture) = button.poll(now_ms) {
            push_event(gesture.into());
        }

        let tick_due = now_ms.wrapping_sub(last_tick_ms) >= tick_ms;
        if tick_due || !events::queue_is_empty() {
            match feeder.lock() {
                Ok(mut f) => {
                    if tick_due {
                        last_tick_ms = now_ms;
                        let synced = f.clock.is_synced();
                        if synced != was_synced {
                            midnight.rearm();
                            was_synced = synced;
                        }
                        let wall = f.clock.now();
                        if midnight.observe(&wall) {
                            push_event(Event::Midnight);
                        }
                        push_event(Event::ControlTick);
                    }
                    events::drain_events(|event| f.handle_event(event));
                }
                Err(_) => {
                    error!("Main: feeder lock poisoned, restarting");
                    esp_idf_svc::hal::reset::restart();
                }
            }
        }

        watchdog.feed();
        FreeRtos::delay_ms(BUTTON_POLL_MS);
    }
}
