//! firemon main entry point.
//!
//! Hexagonal layout with four cooperative monitor threads.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SysfsGpio / SimGpio           IioClimateSensor / SimClimate   │
//! │  (GpioPort)                    (ClimateSensorPort)             │
//! │  LogStatusSink (StatusSink)                                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  digital-input · climate · actuator · status           │    │
//! │  │  SharedDetectionState (cause bits + terminate)         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Supervisor (pin setup · launch · shutdown) · signal listener  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use firemon::adapters::iio_climate::IioClimateSensor;
use firemon::adapters::log_sink::LogStatusSink;
use firemon::adapters::sim::{SimClimate, SimGpio};
use firemon::adapters::sysfs_gpio::SysfsGpio;
use firemon::app::ports::{ClimateSensorPort, GpioPort};
use firemon::config::{Backend, SystemConfig};
use firemon::supervisor::Supervisor;

/// Initial reading of the simulated sensor.
const SIM_TEMPERATURE_C: f32 = 25.0;
const SIM_HUMIDITY_PCT: f32 = 40.0;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  firemon v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let cfg = SystemConfig::load(&path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            info!("Config loaded from {}", path.display());
            cfg
        }
        None => {
            info!("No config file given, using factory defaults");
            SystemConfig::default()
        }
    };
    info!(
        "inputs={:?} output=GPIO{} threshold={:.1}\u{00b0}C tick={}ms backend={:?}",
        config.pins.inputs(),
        config.pins.output(),
        config.fire_threshold_c,
        config.tick_ms,
        config.backend
    );

    // ── 3. Backend selection ──────────────────────────────────
    match config.backend {
        Backend::Sysfs => {
            let gpio = Arc::new(SysfsGpio::new(config.gpio_root.clone()));
            let sensor = IioClimateSensor::new(config.climate_device.clone());
            run(config, gpio, sensor)
        }
        Backend::Simulated => {
            warn!("Simulated backend: no hardware is touched");
            let gpio = Arc::new(SimGpio::new());
            let sensor = SimClimate::new(SIM_TEMPERATURE_C, SIM_HUMIDITY_PCT);
            run(config, gpio, sensor)
        }
    }
}

fn run<G, S>(config: SystemConfig, gpio: Arc<G>, sensor: S) -> Result<()>
where
    G: GpioPort + 'static,
    S: ClimateSensorPort + 'static,
{
    let supervisor = Supervisor::new(config, gpio);

    // ── 4. Termination signals ────────────────────────────────
    let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handlers")?;
    let signals_handle = signals.handle();
    let shutdown = supervisor.shutdown_handle();
    let listener = thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for sig in signals.forever() {
                let name = if sig == SIGINT { "SIGINT" } else { "SIGTERM" };
                shutdown.request_termination(name);
            }
        })
        .context("spawning signal listener")?;

    // ── 5. Run until terminated ───────────────────────────────
    let outcome = supervisor.run(sensor, LogStatusSink::new());

    signals_handle.close();
    if listener.join().is_err() {
        warn!("Signal listener panicked");
    }

    let reports = outcome.context("monitor startup failed")?;
    info!("Shutdown complete ({} tasks joined)", reports.len());
    Ok(())
}
