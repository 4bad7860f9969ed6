//! Digital input monitor: polls the flame/smoke detector pins.
//!
//! One cycle reads every configured input once.  A failed read counts as
//! LOW for that cycle and is not retried; the next cycle reads the pin
//! again anyway.  The result updates `any_pin_high` and the digital fire
//! cause only.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::GpioPort;
use crate::pins::{PinSet, MAX_INPUT_PINS};
use crate::state::SharedDetectionState;

use super::{run_loop, TaskReport};

pub const NAME: &str = "digital-input";

pub struct DigitalInputMonitor<G> {
    gpio: G,
    pins: PinSet,
    /// Level seen on the previous cycle, index-aligned with `pins.inputs()`.
    was_high: [bool; MAX_INPUT_PINS],
    state: Arc<SharedDetectionState>,
    period: Duration,
    read_failures: u64,
}

impl<G: GpioPort> DigitalInputMonitor<G> {
    pub fn new(gpio: G, pins: &PinSet, state: Arc<SharedDetectionState>, period: Duration) -> Self {
        Self {
            gpio,
            pins: pins.clone(),
            was_high: [false; MAX_INPUT_PINS],
            state,
            period,
            read_failures: 0,
        }
    }

    /// Read every input once and publish the result.
    /// Returns `any_pin_high` for this cycle.
    pub fn poll_once(&mut self) -> bool {
        let mut any_high = false;

        for (i, &pin) in self.pins.inputs().iter().enumerate() {
            let high = match self.gpio.read(pin) {
                Ok(level) => level.is_high(),
                Err(e) => {
                    self.read_failures += 1;
                    warn!("{} (treated as LOW this cycle)", e);
                    false
                }
            };

            if high && !self.was_high[i] {
                info!("GPIO{} is HIGH", pin);
            } else if !high && self.was_high[i] {
                debug!("GPIO{} back to LOW", pin);
            }
            self.was_high[i] = high;
            any_high |= high;
        }

        self.state.publish_digital(any_high);
        any_high
    }

    pub fn read_failures(&self) -> u64 {
        self.read_failures
    }

    pub fn run(mut self) -> TaskReport {
        let state = Arc::clone(&self.state);
        let period = self.period;
        let cycles = run_loop(&state, || {
            self.poll_once();
            period
        });
        TaskReport {
            name: NAME,
            cycles,
            io_failures: self.read_failures,
            writes: 0,
        }
    }
}
