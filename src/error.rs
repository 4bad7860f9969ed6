//! Unified error types for the fire monitor.
//!
//! Port-level errors (`GpioError`, `SensorError`) are absorbed by the
//! tasks that hit them.  What reaches the binary is the top-level `Error`:
//! startup failures from the supervisor and pin-set violations from
//! configuration.  All variants are `Copy` so they can be passed between
//! task threads and the supervisor without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Failures that end the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Startup could not complete (pin setup or task launch).
    Setup(SetupError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(e) => write!(f, "setup: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

/// Failure of a single GPIO port operation.  Carries the pin number so the
/// log line identifies the offending line without extra context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The pin could not be exported to user space.
    ExportFailed(u32),
    /// Writing the direction attribute failed.
    DirectionFailed(u32),
    /// Reading the value attribute failed or returned garbage.
    ReadFailed(u32),
    /// Writing the value attribute failed.
    WriteFailed(u32),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExportFailed(p) => write!(f, "export of GPIO{p} failed"),
            Self::DirectionFailed(p) => write!(f, "direction setup of GPIO{p} failed"),
            Self::ReadFailed(p) => write!(f, "read of GPIO{p} failed"),
            Self::WriteFailed(p) => write!(f, "write of GPIO{p} failed"),
        }
    }
}

impl std::error::Error for GpioError {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not answer (checksum, timeout, missing device).
    ReadFailed,
    /// The driver returned text that is not a number.
    Malformed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "sensor read failed"),
            Self::Malformed => write!(f, "malformed sensor value"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Setup errors
// ---------------------------------------------------------------------------

/// Startup failures.  The monitor cannot run without configured pins or
/// without its full task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// A pin could not be configured within the bounded retry policy.
    PinConfig { pin: u32, attempts: u32, last: GpioError },
    /// The OS refused to create a task thread.
    TaskLaunch(&'static str),
    /// Termination was requested while startup was still retrying.
    Interrupted,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinConfig { pin, attempts, last } => {
                write!(f, "GPIO{pin} not configured after {attempts} attempts ({last})")
            }
            Self::TaskLaunch(name) => write!(f, "failed to launch task '{name}'"),
            Self::Interrupted => write!(f, "interrupted by termination request"),
        }
    }
}

impl std::error::Error for SetupError {}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpio_error_names_its_pin() {
        assert_eq!(GpioError::ReadFailed(67).to_string(), "read of GPIO67 failed");
        assert_eq!(GpioError::WriteFailed(26).to_string(), "write of GPIO26 failed");
    }

    #[test]
    fn setup_error_display_names_pin_and_attempts() {
        let e = Error::from(SetupError::PinConfig {
            pin: 45,
            attempts: 3,
            last: GpioError::DirectionFailed(45),
        });
        let text = e.to_string();
        assert!(text.contains("GPIO45"));
        assert!(text.contains("3 attempts"));
    }
}
