//! Piezo buzzer driver (active-HIGH transistor on a GPIO output).
//!
//! Edge-triggered: the driver remembers the level it last drove and only
//! touches the pin when the requested state differs.  The remembered state
//! starts at `Off`, which matches the level the Supervisor writes during
//! pin setup.
//!
//! [`force_off`] is the one unconditional write.  It belongs to safe
//! shutdown and bypasses the remembered state entirely.

use log::{info, warn};

use crate::app::ports::{GpioPort, Level};
use crate::error::GpioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuzzerState {
    #[default]
    Off,
    On,
}

impl From<bool> for BuzzerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

pub struct BuzzerDriver<G> {
    gpio: G,
    pin: u32,
    state: BuzzerState,
    writes: u64,
}

impl<G: GpioPort> BuzzerDriver<G> {
    pub fn new(gpio: G, pin: u32) -> Self {
        Self {
            gpio,
            pin,
            state: BuzzerState::Off,
            writes: 0,
        }
    }

    /// Drive the buzzer toward `fire_detected`.
    ///
    /// Returns `Ok(true)` if a write was issued, `Ok(false)` if the pin
    /// already had the requested level.  On a failed write the remembered
    /// state is left alone so the next call retries the transition.
    pub fn apply(&mut self, fire_detected: bool) -> Result<bool, GpioError> {
        let desired = BuzzerState::from(fire_detected);
        if desired == self.state {
            return Ok(false);
        }

        self.writes += 1;
        self.gpio.write(self.pin, Level::from(fire_detected))?;
        self.state = desired;

        match desired {
            BuzzerState::On => warn!("Buzzer ON: fire detected!"),
            BuzzerState::Off => info!("Buzzer OFF: no fire detected"),
        }
        Ok(true)
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == BuzzerState::On
    }

    /// Write attempts issued so far (successful or not).
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

/// Unconditionally drive the buzzer pin low.
pub fn force_off<G: GpioPort + ?Sized>(gpio: &G, pin: u32) -> Result<(), GpioError> {
    gpio.write(pin, Level::Low)
}
