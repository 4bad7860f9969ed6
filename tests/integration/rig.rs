//! Test rig: the four task bodies wired to simulated hardware, stepped by
//! hand so scenarios are deterministic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use firemon::adapters::sim::{SimClimate, SimGpio};
use firemon::app::events::StatusReport;
use firemon::app::ports::{Level, StatusSink};
use firemon::config::SystemConfig;
use firemon::drivers::buzzer::BuzzerState;
use firemon::pins::{BUZZER_GPIO, PinSet};
use firemon::state::SharedDetectionState;
use firemon::tasks::actuator::ActuatorControl;
use firemon::tasks::climate::{ClimateMonitor, SensorSample};
use firemon::tasks::digital_input::DigitalInputMonitor;

const PERIOD: Duration = Duration::from_millis(1);

pub struct Rig {
    pub gpio: SimGpio,
    pub sensor: SimClimate,
    pub state: Arc<SharedDetectionState>,
    pub digital: DigitalInputMonitor<SimGpio>,
    pub climate: ClimateMonitor<SimClimate>,
    pub actuator: ActuatorControl<SimGpio>,
}

#[allow(dead_code)]
impl Rig {
    /// Factory pins, 29 °C threshold, sensor steady at `temperature_c`.
    pub fn new(temperature_c: f32) -> Self {
        let gpio = SimGpio::new();
        let sensor = SimClimate::new(temperature_c, 40.0);
        let state = Arc::new(SharedDetectionState::new());
        let pins = PinSet::default();
        Self {
            digital: DigitalInputMonitor::new(gpio.clone(), &pins, Arc::clone(&state), PERIOD),
            climate: ClimateMonitor::new(sensor.clone(), Arc::clone(&state), 29.0, PERIOD, PERIOD),
            actuator: ActuatorControl::new(gpio.clone(), BUZZER_GPIO, Arc::clone(&state), PERIOD),
            gpio,
            sensor,
            state,
        }
    }

    /// One digital poll then one actuator step.
    pub fn poll_pins(&mut self) {
        self.digital.poll_once();
        self.actuator.step();
    }

    /// One climate attempt then one actuator step.
    pub fn sample(&mut self) -> SensorSample {
        let s = self.climate.attempt();
        self.actuator.step();
        s
    }

    pub fn buzzer_writes(&self) -> Vec<Level> {
        self.gpio.writes(BUZZER_GPIO)
    }

    pub fn buzzer_on(&self) -> bool {
        self.actuator.buzzer().state() == BuzzerState::On
    }
}

/// Config for threaded runs: short ticks, no real-time policy.
pub fn fast_config() -> SystemConfig {
    let mut c = SystemConfig::default();
    c.tick_ms = 2;
    c.realtime = false;
    c.pin_setup.initial_delay_ms = 1;
    c.pin_setup.max_backoff_ms = 2;
    c
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

/// Status sink that keeps every report.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Arc<std::sync::Mutex<Vec<StatusReport>>>);

impl StatusSink for RecordingSink {
    fn emit(&mut self, report: &StatusReport) {
        self.0.lock().unwrap().push(*report);
    }
}
