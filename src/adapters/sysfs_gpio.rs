//! Linux sysfs GPIO adapter.
//!
//! Implements [`GpioPort`] on top of the legacy `/sys/class/gpio` file
//! interface:
//!
//! | Operation       | File                     | Payload        |
//! |-----------------|--------------------------|----------------|
//! | `export`        | `export`                 | pin number     |
//! | `set_direction` | `gpioN/direction`        | `in` / `out`   |
//! | `read`          | `gpioN/value`            | `0` / `1`      |
//! | `write`         | `gpioN/value`            | `0` / `1`      |
//!
//! Every call opens, uses and closes the attribute file, so the adapter
//! holds no descriptors and is trivially `Sync`.  The root directory is
//! configurable so tests can point it at a scratch tree.

use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::app::ports::{Direction, GpioPort, Level};
use crate::error::GpioError;

pub struct SysfsGpio {
    root: PathBuf,
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn attr(&self, pin: u32, name: &str) -> PathBuf {
        self.pin_dir(pin).join(name)
    }
}

impl GpioPort for SysfsGpio {
    fn export(&self, pin: u32) -> Result<(), GpioError> {
        // The kernel rejects a second export with EBUSY; treat an existing
        // pin directory as success.
        if self.pin_dir(pin).is_dir() {
            return Ok(());
        }
        fs::write(self.root.join("export"), pin.to_string()).map_err(|e| {
            debug!("sysfs: export GPIO{}: {}", pin, e);
            GpioError::ExportFailed(pin)
        })
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), GpioError> {
        fs::write(self.attr(pin, "direction"), direction.as_str()).map_err(|e| {
            debug!("sysfs: direction GPIO{}: {}", pin, e);
            GpioError::DirectionFailed(pin)
        })
    }

    fn read(&self, pin: u32) -> Result<Level, GpioError> {
        let raw = fs::read(self.attr(pin, "value")).map_err(|e| {
            debug!("sysfs: read GPIO{}: {}", pin, e);
            GpioError::ReadFailed(pin)
        })?;
        match raw.first() {
            Some(b'1') => Ok(Level::High),
            Some(b'0') => Ok(Level::Low),
            _ => Err(GpioError::ReadFailed(pin)),
        }
    }

    fn write(&self, pin: u32, level: Level) -> Result<(), GpioError> {
        let payload = if level.is_high() { "1" } else { "0" };
        fs::write(self.attr(pin, "value"), payload).map_err(|e| {
            debug!("sysfs: write GPIO{}: {}", pin, e);
            GpioError::WriteFailed(pin)
        })
    }
}
