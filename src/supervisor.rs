//! Supervisor: startup, task launch, termination and safe shutdown.
//!
//! ```text
//!  configure_pins ──▶ launch ──▶ [ digital · climate · actuator · status ]
//!                                         │  (cooperative loops)
//!  SIGINT/SIGTERM ──▶ ShutdownHandle ─────┤  terminate = true, wake all,
//!                     safe_shutdown()     │  buzzer pin ← 0
//!                                         ▼
//!                                       join ──▶ safe_shutdown() ──▶ exit
//! ```
//!
//! ## Shutdown contract
//!
//! Safe shutdown writes LOW to the buzzer pin without looking at the
//! actuator's remembered state.  It runs twice on a signalled exit: once
//! from the signal listener as soon as the request arrives, and once on
//! the main thread after every task has joined.  The second write is the
//! one that matters if the actuator task managed a last HIGH write
//! between the two; after the join nothing else can touch the pin, so the
//! process always exits with the buzzer off.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, info, warn};

use crate::app::ports::{ClimateSensorPort, GpioPort, StatusSink};
use crate::config::{PriorityMap, PriorityTier, SystemConfig};
use crate::drivers::buzzer;
use crate::drivers::pin_setup;
use crate::drivers::rt_thread::{self, ThreadSpec};
use crate::error::{self, SetupError};
use crate::state::SharedDetectionState;
use crate::tasks::actuator::{self, ActuatorControl};
use crate::tasks::climate::{self, ClimateMonitor};
use crate::tasks::digital_input::{self, DigitalInputMonitor};
use crate::tasks::status::{self, StatusReporter};
use crate::tasks::TaskReport;

/// Attempts per safe-shutdown write before giving up.
const SHUTDOWN_WRITE_ATTEMPTS: u32 = 3;
const SHUTDOWN_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Boxed task body handed to a [`Spawner`].
pub type TaskBody = Box<dyn FnOnce() -> TaskReport + Send>;

/// Creates one task thread.  The default is
/// [`rt_thread::spawn_with_priority`].
pub type Spawner = fn(ThreadSpec, PriorityMap, TaskBody) -> io::Result<JoinHandle<TaskReport>>;

fn spawn_rt(spec: ThreadSpec, priorities: PriorityMap, body: TaskBody) -> io::Result<JoinHandle<TaskReport>> {
    rt_thread::spawn_with_priority(spec, priorities, body)
}

// ───────────────────────────────────────────────────────────────
// ShutdownHandle
// ───────────────────────────────────────────────────────────────

/// Cloneable handle that can stop the monitor from any thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    state: Arc<SharedDetectionState>,
    gpio: Arc<dyn GpioPort>,
    output_pin: u32,
    runs: Arc<AtomicU32>,
}

impl ShutdownHandle {
    /// Set `terminate`, wake every task and drive the buzzer off.
    /// Safe to call any number of times.
    pub fn request_termination(&self, reason: &str) {
        if self.state.request_terminate() {
            info!("Termination requested ({}), stopping tasks", reason);
        } else {
            info!("Termination already in progress ({})", reason);
        }
        self.safe_shutdown();
    }

    /// Unconditionally write LOW to the buzzer pin.
    pub fn safe_shutdown(&self) {
        let run = self.runs.fetch_add(1, Ordering::AcqRel) + 1;
        if run == 1 {
            info!("Cleaning up: forcing buzzer GPIO{} off", self.output_pin);
        }

        for attempt in 1..=SHUTDOWN_WRITE_ATTEMPTS {
            match buzzer::force_off(&*self.gpio, self.output_pin) {
                Ok(()) => {
                    info!("Cleanup completed (buzzer off, pass {})", run);
                    return;
                }
                Err(e) if attempt < SHUTDOWN_WRITE_ATTEMPTS => {
                    warn!("safe shutdown: {} (attempt {}), retrying", e, attempt);
                    std::thread::sleep(SHUTDOWN_RETRY_DELAY);
                }
                Err(e) => error!("safe shutdown: {} after {} attempts, buzzer state unknown", e, attempt),
            }
        }
    }

    /// How many times safe shutdown has run.
    pub fn shutdown_runs(&self) -> u32 {
        self.runs.load(Ordering::Acquire)
    }
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

/// Join handles of the launched tasks, in launch order.
pub struct RunningTasks {
    handles: Vec<(&'static str, JoinHandle<TaskReport>)>,
}

impl RunningTasks {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

pub struct Supervisor<G> {
    config: SystemConfig,
    gpio: Arc<G>,
    state: Arc<SharedDetectionState>,
    shutdown: ShutdownHandle,
    spawner: Spawner,
}

impl<G: GpioPort + 'static> Supervisor<G> {
    pub fn new(config: SystemConfig, gpio: Arc<G>) -> Self {
        let state = Arc::new(SharedDetectionState::new());
        let dyn_gpio: Arc<dyn GpioPort> = gpio.clone();
        let shutdown = ShutdownHandle {
            state: Arc::clone(&state),
            gpio: dyn_gpio,
            output_pin: config.pins.output(),
            runs: Arc::new(AtomicU32::new(0)),
        };
        Self {
            config,
            gpio,
            state,
            shutdown,
            spawner: spawn_rt,
        }
    }

    /// Replace the thread spawner.
    #[must_use]
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn state(&self) -> &Arc<SharedDetectionState> {
        &self.state
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Export and set the direction of every pin.  Blocks per the
    /// configured retry policy.
    pub fn configure_pins(&self) -> Result<(), SetupError> {
        pin_setup::configure_all(&*self.gpio, &self.config.pins, &self.config.pin_setup, &self.state)
    }

    fn spec(&self, name: &'static str, tier: PriorityTier) -> ThreadSpec {
        ThreadSpec {
            name,
            tier,
            stack_kb: self.config.task_stack_kb,
            realtime: self.config.realtime,
        }
    }

    fn spawn(
        &self,
        running: &mut RunningTasks,
        spec: ThreadSpec,
        body: impl FnOnce() -> TaskReport + Send + 'static,
    ) -> Result<(), SetupError> {
        match (self.spawner)(spec, self.config.priorities, Box::new(body)) {
            Ok(handle) => {
                running.handles.push((spec.name, handle));
                Ok(())
            }
            Err(e) => {
                error!("Failed to launch '{}': {}", spec.name, e);
                Err(SetupError::TaskLaunch(spec.name))
            }
        }
    }

    /// Launch the four tasks.  If any launch fails, the tasks already
    /// running are stopped and joined, the buzzer is forced off and the
    /// launch error is returned.
    pub fn launch<S, K>(&self, sensor: S, sink: K) -> Result<RunningTasks, SetupError>
    where
        S: ClimateSensorPort + 'static,
        K: StatusSink + 'static,
    {
        let mut running = RunningTasks { handles: Vec::with_capacity(4) };

        if let Err(e) = self.launch_all(&mut running, sensor, sink) {
            self.shutdown.request_termination("task launch failure");
            self.join(running);
            self.shutdown.safe_shutdown();
            return Err(e);
        }

        info!("All {} tasks running", running.len());
        Ok(running)
    }

    fn launch_all<S, K>(&self, running: &mut RunningTasks, sensor: S, sink: K) -> Result<(), SetupError>
    where
        S: ClimateSensorPort + 'static,
        K: StatusSink + 'static,
    {
        let cfg = &self.config;

        let digital = DigitalInputMonitor::new(
            Arc::clone(&self.gpio),
            &cfg.pins,
            Arc::clone(&self.state),
            cfg.ticks(cfg.digital_period_ticks),
        );
        self.spawn(running, self.spec(digital_input::NAME, PriorityTier::Medium), move || digital.run())?;

        let actuator = ActuatorControl::new(
            Arc::clone(&self.gpio),
            cfg.pins.output(),
            Arc::clone(&self.state),
            cfg.ticks(cfg.actuator_period_ticks),
        );
        self.spawn(running, self.spec(actuator::NAME, PriorityTier::Low), move || actuator.run())?;

        let climate = ClimateMonitor::new(
            sensor,
            Arc::clone(&self.state),
            cfg.fire_threshold_c,
            cfg.ticks(cfg.climate_period_ticks),
            cfg.ticks(cfg.climate_retry_ticks),
        );
        self.spawn(running, self.spec(climate::NAME, PriorityTier::High), move || climate.run())?;

        let status = StatusReporter::new(sink, Arc::clone(&self.state), cfg.ticks(cfg.status_period_ticks));
        self.spawn(running, self.spec(status::NAME, PriorityTier::Low), move || status.run())
    }

    /// Wait for every task to observe `terminate` and return.
    pub fn join(&self, tasks: RunningTasks) -> Vec<TaskReport> {
        let mut reports = Vec::with_capacity(tasks.handles.len());
        for (name, handle) in tasks.handles {
            match handle.join() {
                Ok(report) => {
                    info!(
                        "Task '{}' stopped: cycles={} io_failures={} writes={}",
                        report.name, report.cycles, report.io_failures, report.writes
                    );
                    reports.push(report);
                }
                Err(_) => error!("Task '{}' panicked", name),
            }
        }
        reports
    }

    pub fn safe_shutdown(&self) {
        self.shutdown.safe_shutdown();
    }

    /// Full lifecycle: configure pins, launch, wait for termination, join,
    /// safe shutdown.  Returns the per-task reports.
    ///
    /// Termination during pin setup is a clean exit with no reports.
    pub fn run<S, K>(&self, sensor: S, sink: K) -> error::Result<Vec<TaskReport>>
    where
        S: ClimateSensorPort + 'static,
        K: StatusSink + 'static,
    {
        match self.configure_pins() {
            Ok(()) => {}
            Err(SetupError::Interrupted) => {
                info!("Terminated during pin setup");
                self.safe_shutdown();
                return Ok(Vec::new());
            }
            Err(e) => {
                self.safe_shutdown();
                return Err(e.into());
            }
        }

        let tasks = self.launch(sensor, sink)?;
        let reports = self.join(tasks);
        self.safe_shutdown();
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::log_sink::LogStatusSink;
    use crate::adapters::sim::{SimClimate, SimGpio};
    use crate::app::ports::Level;

    fn fast_config() -> SystemConfig {
        let mut c = SystemConfig::default();
        c.tick_ms = 2;
        c.realtime = false;
        c.pin_setup.initial_delay_ms = 1;
        c.pin_setup.max_backoff_ms = 1;
        c
    }

    #[test]
    fn shutdown_handle_is_idempotent() {
        let gpio = Arc::new(SimGpio::new());
        let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
        let h = sup.shutdown_handle();
        h.request_termination("test");
        h.request_termination("test again");
        assert!(sup.state().is_terminating());
        assert_eq!(h.shutdown_runs(), 2);
        assert_eq!(gpio.writes(26), vec![Level::Low, Level::Low]);
    }

    #[test]
    fn launch_and_join_returns_four_reports() {
        let gpio = Arc::new(SimGpio::new());
        let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
        sup.configure_pins().unwrap();
        let tasks = sup.launch(SimClimate::new(22.0, 40.0), LogStatusSink::new()).unwrap();
        assert_eq!(tasks.len(), 4);
        std::thread::sleep(Duration::from_millis(30));
        sup.shutdown_handle().request_termination("test");
        let reports = sup.join(tasks);
        let names: Vec<_> = reports.iter().map(|r| r.name).collect();
        assert_eq!(names, vec![digital_input::NAME, actuator::NAME, climate::NAME, status::NAME]);
    }

    #[test]
    fn bounded_setup_failure_is_reported_and_buzzer_forced_off() {
        let gpio = Arc::new(SimGpio::new());
        gpio.fail_setup(69, u32::MAX);
        let mut cfg = fast_config();
        cfg.pin_setup.max_attempts = Some(2);
        let sup = Supervisor::new(cfg, Arc::clone(&gpio));
        let err = sup.run(SimClimate::new(22.0, 40.0), LogStatusSink::new()).unwrap_err();
        assert!(matches!(
            err,
            error::Error::Setup(SetupError::PinConfig { pin: 69, attempts: 2, .. })
        ));
        assert_eq!(gpio.writes(26).last(), Some(&Level::Low));
    }

    #[test]
    fn termination_during_setup_is_clean() {
        let gpio = Arc::new(SimGpio::new());
        gpio.fail_setup(66, u32::MAX);
        let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
        sup.shutdown_handle().request_termination("early");
        let reports = sup.run(SimClimate::new(22.0, 40.0), LogStatusSink::new()).unwrap();
        assert!(reports.is_empty());
    }

    /// Refuses the climate thread; every other task launches normally.
    fn refuse_climate(spec: ThreadSpec, priorities: PriorityMap, body: TaskBody) -> io::Result<JoinHandle<TaskReport>> {
        if spec.name == climate::NAME {
            return Err(io::Error::new(io::ErrorKind::OutOfMemory, "no thread for you"));
        }
        spawn_rt(spec, priorities, body)
    }

    #[test]
    fn partial_launch_failure_stops_started_tasks_and_silences_buzzer() {
        let gpio = Arc::new(SimGpio::new());
        gpio.set_level(66, Level::High);
        let sup = Supervisor::new(fast_config(), Arc::clone(&gpio)).with_spawner(refuse_climate);
        sup.configure_pins().unwrap();

        // digital-input and actuator are already running when climate fails.
        let err = sup.launch(SimClimate::new(22.0, 40.0), LogStatusSink::new()).err();
        assert_eq!(err, Some(SetupError::TaskLaunch(climate::NAME)));
        assert!(sup.state().is_terminating());
        assert_eq!(gpio.level(26), Level::Low);
        assert_eq!(gpio.writes(26).last(), Some(&Level::Low));
        assert!(sup.shutdown_handle().shutdown_runs() >= 2);
    }

    #[test]
    fn run_reports_launch_failure_as_error() {
        let gpio = Arc::new(SimGpio::new());
        let sup = Supervisor::new(fast_config(), Arc::clone(&gpio)).with_spawner(refuse_climate);
        let err = sup.run(SimClimate::new(22.0, 40.0), LogStatusSink::new()).unwrap_err();
        assert_eq!(err, error::Error::Setup(SetupError::TaskLaunch(climate::NAME)));
        assert_eq!(gpio.level(26), Level::Low);
    }
}
