//! Climate monitor: samples the temperature/humidity sensor and owns the
//! over-temperature fire cause.
//!
//! ## Sampling contract
//!
//! - After a good reading the task sleeps the full sample period.
//! - After a failed reading it records an invalid sample and retries after
//!   the (shorter) retry delay, indefinitely.  A dead sensor stalls only
//!   this task; the digital inputs and the buzzer keep running.
//! - Only valid samples reach the shared state.  An invalid sample never
//!   sets or clears the climate cause; the last valid decision stands.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{ClimateReading, ClimateSensorPort};
use crate::error::SensorError;
use crate::state::SharedDetectionState;

use super::{run_loop, TaskReport};

pub const NAME: &str = "climate";

/// DHT22 operating range.
pub const TEMPERATURE_RANGE_C: RangeInclusive<f32> = -40.0..=80.0;
pub const HUMIDITY_RANGE_PCT: RangeInclusive<f32> = 0.0..=100.0;

/// Value stored in both fields of an invalid sample.
pub const INVALID_SENTINEL: f32 = -1.0;

/// Log every failure until this many in a row, then only every Nth.
const FAILURE_LOG_EVERY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub validity: Validity,
}

impl SensorSample {
    pub const fn invalid() -> Self {
        Self {
            temperature_c: INVALID_SENTINEL,
            humidity_pct: INVALID_SENTINEL,
            validity: Validity::Invalid,
        }
    }

    pub const fn valid(reading: ClimateReading) -> Self {
        Self {
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            validity: Validity::Valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }
}

/// Reject readings the sensor cannot physically produce.
pub fn check_plausible(reading: ClimateReading) -> Result<ClimateReading, SensorError> {
    if TEMPERATURE_RANGE_C.contains(&reading.temperature_c) && HUMIDITY_RANGE_PCT.contains(&reading.humidity_pct) {
        Ok(reading)
    } else {
        Err(SensorError::OutOfRange)
    }
}

pub struct ClimateMonitor<S> {
    sensor: S,
    state: Arc<SharedDetectionState>,
    threshold_c: f32,
    sample_period: Duration,
    retry_delay: Duration,
    last: SensorSample,
    consecutive_failures: u32,
    total_failures: u64,
}

impl<S: ClimateSensorPort> ClimateMonitor<S> {
    pub fn new(
        sensor: S,
        state: Arc<SharedDetectionState>,
        threshold_c: f32,
        sample_period: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            sensor,
            state,
            threshold_c,
            sample_period,
            retry_delay,
            last: SensorSample::invalid(),
            consecutive_failures: 0,
            total_failures: 0,
        }
    }

    /// One read attempt.  Returns the sample it produced; only a valid
    /// sample is published.
    pub fn attempt(&mut self) -> SensorSample {
        match self.sensor.read_once().and_then(check_plausible) {
            Ok(reading) => {
                if self.consecutive_failures > 0 {
                    info!("climate: sensor recovered after {} failed reads", self.consecutive_failures);
                }
                self.consecutive_failures = 0;
                self.last = SensorSample::valid(reading);
                let fire = self.state.publish_climate(reading, self.threshold_c);
                info!(
                    "Temperature: {:.2}\u{00b0}C, Humidity: {:.2}% (fire={})",
                    reading.temperature_c, reading.humidity_pct, fire
                );
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.total_failures += 1;
                self.last = SensorSample::invalid();
                if self.consecutive_failures <= FAILURE_LOG_EVERY
                    || self.consecutive_failures % FAILURE_LOG_EVERY == 0
                {
                    warn!("climate: {} ({} in a row), retrying", e, self.consecutive_failures);
                } else {
                    debug!("climate: {} ({} in a row)", e, self.consecutive_failures);
                }
            }
        }
        self.last
    }

    /// Delay before the next attempt, given the last outcome.
    pub fn next_delay(&self) -> Duration {
        if self.last.is_valid() {
            self.sample_period
        } else {
            self.retry_delay
        }
    }

    pub fn last_sample(&self) -> SensorSample {
        self.last
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn run(mut self) -> TaskReport {
        let state = Arc::clone(&self.state);
        let cycles = run_loop(&state, || {
            self.attempt();
            self.next_delay()
        });
        TaskReport {
            name: NAME,
            cycles,
            io_failures: self.total_failures,
            writes: 0,
        }
    }
}
