//! Port traits: the hexagonal boundary between the task logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ tasks / Supervisor (domain)
//! ```
//!
//! Driven adapters (sysfs GPIO, IIO climate sensor, log sink, simulation)
//! implement these traits.  The tasks consume them via generics, so the
//! domain core never touches hardware directly.
//!
//! ## Threading notes
//!
//! - [`GpioPort`] is shared by every task and the Supervisor, so its
//!   methods take `&self` and implementations must be `Send + Sync`.
//! - [`ClimateSensorPort`] and [`StatusSink`] are each owned by exactly
//!   one task and take `&mut self`.

use crate::error::{GpioError, SensorError};

use super::events::StatusReport;

// ───────────────────────────────────────────────────────────────
// GPIO port (hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Text accepted by the kernel `direction` attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Logic level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// Pin-number addressed GPIO access.
pub trait GpioPort: Send + Sync {
    /// Make the pin available to user space.  Exporting an already
    /// exported pin must succeed.
    fn export(&self, pin: u32) -> Result<(), GpioError>;

    /// Configure the pin as input or output.
    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), GpioError>;

    /// Sample the current level.
    fn read(&self, pin: u32) -> Result<Level, GpioError>;

    /// Drive an output pin.
    fn write(&self, pin: u32, level: Level) -> Result<(), GpioError>;
}

impl<T: GpioPort + ?Sized> GpioPort for std::sync::Arc<T> {
    fn export(&self, pin: u32) -> Result<(), GpioError> {
        (**self).export(pin)
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        (**self).set_direction(pin, direction)
    }

    fn read(&self, pin: u32) -> Result<Level, GpioError> {
        (**self).read(pin)
    }

    fn write(&self, pin: u32, level: Level) -> Result<(), GpioError> {
        (**self).write(pin, level)
    }
}

// ───────────────────────────────────────────────────────────────
// Climate sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One successful temperature/humidity measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Single-shot temperature/humidity sensor (DHT22 class).
pub trait ClimateSensorPort: Send {
    /// Attempt one measurement.  No internal retry.
    fn read_once(&mut self) -> Result<ClimateReading, SensorError>;
}

impl<T: ClimateSensorPort + ?Sized> ClimateSensorPort for Box<T> {
    fn read_once(&mut self) -> Result<ClimateReading, SensorError> {
        (**self).read_once()
    }
}

// ───────────────────────────────────────────────────────────────
// Status sink port (domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The status reporter pushes periodic snapshots through this port.
/// Adapters decide where they go (serial log, LCD, test recorder).
pub trait StatusSink: Send {
    fn emit(&mut self, report: &StatusReport);
}

impl<T: StatusSink + ?Sized> StatusSink for Box<T> {
    fn emit(&mut self, report: &StatusReport) {
        (**self).emit(report);
    }
}
