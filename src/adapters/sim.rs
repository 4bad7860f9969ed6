//! In-memory hardware adapters.
//!
//! [`SimGpio`] and [`SimClimate`] implement the GPIO and climate ports
//! without touching the kernel.  The binary uses them for
//! `backend = "simulated"`; the test suites use them to inject pin levels,
//! sensor readings and failures, and to inspect every write.
//!
//! Both types are cheap handles around shared state, so a test can keep a
//! clone and steer the hardware while the tasks run.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::ports::{ClimateReading, ClimateSensorPort, Direction, GpioPort, Level};
use crate::error::{GpioError, SensorError};

// ── SimGpio ───────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SimPin {
    exported: bool,
    direction: Option<Direction>,
    level: Level,
    writes: Vec<Level>,
    fail_setup: u32,
    fail_reads: u32,
    fail_writes: u32,
}

/// Simulated pin bank.
#[derive(Debug, Clone, Default)]
pub struct SimGpio {
    pins: Arc<Mutex<HashMap<u32, SimPin>>>,
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, SimPin>> {
        self.pins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive an input pin from the outside world.
    pub fn set_level(&self, pin: u32, level: Level) {
        self.lock().entry(pin).or_default().level = level;
    }

    pub fn level(&self, pin: u32) -> Level {
        self.lock().get(&pin).map(|p| p.level).unwrap_or_default()
    }

    pub fn direction(&self, pin: u32) -> Option<Direction> {
        self.lock().get(&pin).and_then(|p| p.direction)
    }

    pub fn is_exported(&self, pin: u32) -> bool {
        self.lock().get(&pin).is_some_and(|p| p.exported)
    }

    /// Every level written to `pin`, oldest first (failed writes excluded).
    pub fn writes(&self, pin: u32) -> Vec<Level> {
        self.lock().get(&pin).map(|p| p.writes.clone()).unwrap_or_default()
    }

    /// Make the next `n` export attempts on `pin` fail.
    pub fn fail_setup(&self, pin: u32, n: u32) {
        self.lock().entry(pin).or_default().fail_setup = n;
    }

    /// Make the next `n` reads of `pin` fail.
    pub fn fail_reads(&self, pin: u32, n: u32) {
        self.lock().entry(pin).or_default().fail_reads = n;
    }

    /// Make the next `n` writes to `pin` fail.
    pub fn fail_writes(&self, pin: u32, n: u32) {
        self.lock().entry(pin).or_default().fail_writes = n;
    }
}

/// Consume one injected failure, if any are pending.
fn take_failure(counter: &mut u32) -> bool {
    if *counter == 0 {
        return false;
    }
    *counter = counter.saturating_sub(1);
    true
}

impl GpioPort for SimGpio {
    fn export(&self, pin: u32) -> Result<(), GpioError> {
        let mut pins = self.lock();
        let p = pins.entry(pin).or_default();
        if take_failure(&mut p.fail_setup) {
            return Err(GpioError::ExportFailed(pin));
        }
        p.exported = true;
        Ok(())
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        let mut pins = self.lock();
        let p = pins.entry(pin).or_default();
        if !p.exported {
            return Err(GpioError::DirectionFailed(pin));
        }
        p.direction = Some(direction);
        Ok(())
    }

    fn read(&self, pin: u32) -> Result<Level, GpioError> {
        let mut pins = self.lock();
        let p = pins.entry(pin).or_default();
        if take_failure(&mut p.fail_reads) {
            return Err(GpioError::ReadFailed(pin));
        }
        Ok(p.level)
    }

    fn write(&self, pin: u32, level: Level) -> Result<(), GpioError> {
        let mut pins = self.lock();
        let p = pins.entry(pin).or_default();
        if take_failure(&mut p.fail_writes) {
            return Err(GpioError::WriteFailed(pin));
        }
        p.level = level;
        p.writes.push(level);
        Ok(())
    }
}

// ── SimClimate ────────────────────────────────────────────────

#[derive(Debug)]
struct ClimateScript {
    /// One-shot results consumed before falling back to `steady`.
    queued: VecDeque<Result<ClimateReading, SensorError>>,
    steady: ClimateReading,
    reads: u64,
}

/// Simulated DHT22: answers queued results first, then a steady reading.
#[derive(Debug, Clone)]
pub struct SimClimate {
    script: Arc<Mutex<ClimateScript>>,
}

impl SimClimate {
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            script: Arc::new(Mutex::new(ClimateScript {
                queued: VecDeque::new(),
                steady: ClimateReading {
                    temperature_c,
                    humidity_pct,
                },
                reads: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClimateScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the reading returned once the queue is empty.
    pub fn set_steady(&self, temperature_c: f32, humidity_pct: f32) {
        self.lock().steady = ClimateReading {
            temperature_c,
            humidity_pct,
        };
    }

    /// Queue a one-shot result.
    pub fn push(&self, result: Result<ClimateReading, SensorError>) {
        self.lock().queued.push_back(result);
    }

    /// Queue `n` consecutive read failures.
    pub fn push_failures(&self, n: usize) {
        let mut script = self.lock();
        for _ in 0..n {
            script.queued.push_back(Err(SensorError::ReadFailed));
        }
    }

    /// Total `read_once` calls so far.
    pub fn reads(&self) -> u64 {
        self.lock().reads
    }

    /// Results still queued.
    pub fn pending(&self) -> usize {
        self.lock().queued.len()
    }
}

impl ClimateSensorPort for SimClimate {
    fn read_once(&mut self) -> Result<ClimateReading, SensorError> {
        let mut script = self.lock();
        script.reads += 1;
        match script.queued.pop_front() {
            Some(result) => result,
            None => Ok(script.steady),
        }
    }
}
