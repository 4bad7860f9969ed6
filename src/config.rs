//! System configuration parameters
//!
//! All tunable parameters for the fire monitor.  Values are fixed at
//! startup: either the factory defaults or a JSON file named on the
//! command line.  Nothing changes them while the tasks run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pins::PinSet;

/// Bounds on the per-task stack size (KiB).
pub const MIN_TASK_STACK_KB: usize = 16;
pub const MAX_TASK_STACK_KB: usize = 8192;

/// Scheduling tier assigned to a task at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

/// Maps priority tiers to OS real-time priorities (SCHED_FIFO, 1–99 on Linux).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityMap {
    pub high: u8,
    pub medium: u8,
    pub low: u8,
}

impl PriorityMap {
    pub fn value(&self, tier: PriorityTier) -> u8 {
        match tier {
            PriorityTier::High => self.high,
            PriorityTier::Medium => self.medium,
            PriorityTier::Low => self.low,
        }
    }
}

impl Default for PriorityMap {
    fn default() -> Self {
        Self {
            high: 90,
            medium: 60,
            low: 30,
        }
    }
}

/// Retry discipline for pin export/direction setup at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// `None` retries forever (startup blocks until the pin is usable).
    pub max_attempts: Option<u32>,
    /// Delay after the first failed attempt.
    pub initial_delay_ms: u64,
    /// Backoff doubles per failure up to this cap.
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ms = self
            .initial_delay_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_ms.max(self.initial_delay_ms));
        Duration::from_millis(ms)
    }

    /// True once `attempts` failures exhaust a bounded policy.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_delay_ms: 1000,
            max_backoff_ms: 8000,
        }
    }
}

/// Which hardware adapters the binary wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Linux sysfs GPIO + IIO humidity/temperature driver.
    Sysfs,
    /// In-memory pins and a fixed-temperature sensor.
    Simulated,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Wiring ---
    /// Detector inputs and buzzer output.
    pub pins: PinSet,

    // --- Detection ---
    /// Temperature (Celsius) strictly above which fire is asserted.
    pub fire_threshold_c: f32,

    // --- Timing ---
    /// Length of one time unit (milliseconds).  All periods below count these.
    pub tick_ms: u64,
    /// Digital input poll period (ticks).
    pub digital_period_ticks: u32,
    /// Climate sample period after a good read (ticks).
    pub climate_period_ticks: u32,
    /// Climate retry delay after a failed read (ticks).
    pub climate_retry_ticks: u32,
    /// Buzzer control period (ticks).
    pub actuator_period_ticks: u32,
    /// Status report period (ticks).
    pub status_period_ticks: u32,

    // --- Scheduling ---
    /// Request SCHED_FIFO for task threads.  Falls back to normal
    /// scheduling when the process lacks the privilege.
    pub realtime: bool,
    pub priorities: PriorityMap,
    /// Stack size per task thread (KiB).
    pub task_stack_kb: usize,

    // --- Startup ---
    pub pin_setup: RetryPolicy,

    // --- Hardware ---
    pub backend: Backend,
    /// Root of the sysfs GPIO class directory.
    pub gpio_root: PathBuf,
    /// IIO device directory of the humidity/temperature sensor.
    pub climate_device: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            pins: PinSet::default(),

            fire_threshold_c: 29.0,

            tick_ms: 1000,
            digital_period_ticks: 1,
            climate_period_ticks: 5,
            climate_retry_ticks: 1,
            actuator_period_ticks: 1,
            status_period_ticks: 2,

            realtime: true,
            priorities: PriorityMap::default(),
            task_stack_kb: 64,

            pin_setup: RetryPolicy::default(),

            backend: Backend::Sysfs,
            gpio_root: PathBuf::from("/sys/class/gpio"),
            climate_device: PathBuf::from("/sys/bus/iio/devices/iio:device0"),
        }
    }
}

impl SystemConfig {
    /// Convert a period in ticks to wall time.
    pub fn ticks(&self, n: u32) -> Duration {
        Duration::from_millis(self.tick_ms.saturating_mul(u64::from(n)))
    }

    /// Reject values that would make the monitor unsafe or spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fire_threshold_c.is_finite() {
            return Err(ConfigError::ValidationFailed("fire_threshold_c must be finite"));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_ms must be non-zero"));
        }
        let periods = [
            self.digital_period_ticks,
            self.climate_period_ticks,
            self.climate_retry_ticks,
            self.actuator_period_ticks,
            self.status_period_ticks,
        ];
        if periods.contains(&0) {
            return Err(ConfigError::ValidationFailed("task periods must be non-zero"));
        }
        let p = self.priorities;
        if [p.high, p.medium, p.low].iter().any(|v| !(1..=99).contains(v)) {
            return Err(ConfigError::ValidationFailed("priorities must be within 1..=99"));
        }
        if !(p.high >= p.medium && p.medium >= p.low) {
            return Err(ConfigError::ValidationFailed("priority tiers must be ordered high >= medium >= low"));
        }
        if self.pin_setup.max_attempts == Some(0) {
            return Err(ConfigError::ValidationFailed("pin_setup.max_attempts must be at least 1"));
        }
        if !(MIN_TASK_STACK_KB..=MAX_TASK_STACK_KB).contains(&self.task_stack_kb) {
            return Err(ConfigError::ValidationFailed("task_stack_kb must be within 16..=8192"));
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file.  Missing fields take
    /// their factory defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound)?;
        let config: Self = serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors from loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    NotFound,
    /// The file is not valid JSON for [`SystemConfig`] (includes pin-set
    /// invariant violations).
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config file not readable"),
            Self::Corrupted => write!(f, "config file corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
