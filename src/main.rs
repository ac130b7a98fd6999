//! Spoolgate Firmware — Main Entry Point
//!
//! Pairs an NFC spool scan with the next filament-sensor edge on an MMU
//! gate and tells Klipper, through Moonraker, which spool went where.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartScanSource   MoonrakerSensors   MoonrakerCommands         │
//! │  (ScanSource)     (GateSensorPort)   (CommandSink)             │
//! │  LogEventSink     Esp32Clock         EspHttpTransport          │
//! │  (EventSink)      (TimePort)         (HttpTransport)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           CorrelationEngine (pure logic)               │    │
//! │  │  pending scan · baseline · edge detection              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  GateLoop (read + tick) · Watchdog                             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{error, info};

use spoolgate::adapters::http::EspHttpTransport;
use spoolgate::adapters::log_sink::LogEventSink;
use spoolgate::adapters::moonraker_client::{MoonrakerCommands, MoonrakerSensors};
use spoolgate::adapters::time::Esp32Clock;
use spoolgate::adapters::uart::UartScanSource;
use spoolgate::adapters::wifi;
use spoolgate::app::ports::SerialError;
use spoolgate::app::runner::GateLoop;
use spoolgate::app::service::CorrelationEngine;
use spoolgate::config::SystemConfig;
use spoolgate::diagnostics;
use spoolgate::drivers::watchdog::{self, Watchdog};
use spoolgate::error::Error;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Spoolgate v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::from_build_env();
    config.validate().map_err(Error::Config)?;
    info!(
        "Config: moonraker={} gates={} macro={} timeout={}s",
        config.moonraker_base_url,
        config.gate_count,
        config.macro_name,
        config.pending_timeout_secs
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // Keep the handle alive: dropping it tears the station down.
    let _wifi = wifi::connect(peripherals.modem)?;

    // Reader TX -> GPIO18, reader RX <- GPIO17.
    let uart_config = UartConfig::new().baudrate(Hertz(config.serial_baud));
    let uart = UartDriver::new(
        peripherals.uart1,
        pins.gpio17,
        pins.gpio18,
        Option::<AnyInputPin>::None,
        Option::<AnyOutputPin>::None,
        &uart_config,
    )
    .map_err(|_| Error::Serial(SerialError::OpenFailed))?;
    info!("NFC reader on UART1 @ {} baud", config.serial_baud);

    // ── 4. Adapters + engine ──────────────────────────────────
    let sensors = MoonrakerSensors::new(
        EspHttpTransport::new(&config.moonraker_base_url),
        &config,
    );
    let commands = MoonrakerCommands::new(
        EspHttpTransport::new(&config.moonraker_base_url),
        &config,
    );
    let mut engine = CorrelationEngine::new(&config, sensors, commands, LogEventSink::new());
    engine.start();

    let clock = Esp32Clock::new();
    let mut gate_loop = GateLoop::new(&config, UartScanSource::new(uart), clock);

    let watchdog = Watchdog::new(watchdog::timeout_for(&config));

    // ── 5. Run ────────────────────────────────────────────────
    info!("Entering main loop");
    let result = gate_loop.run(&mut engine, || watchdog.feed());

    let uptime_secs = gate_loop.clock().uptime_us() / 1_000_000;
    info!("{}", diagnostics::stats_line(&engine.stats(), uptime_secs));

    if let Err(e) = result {
        error!("NFC reader failed: {}", e);
        return Err(Error::Serial(e).into());
    }
    Ok(())
}
