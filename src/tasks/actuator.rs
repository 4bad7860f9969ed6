//! Actuator control: follows `fire_detected` with the buzzer.
//!
//! Edge-triggered through [`BuzzerDriver`]: the pin is written only when
//! the decision changes.  A failed write is logged and retried on the
//! next cycle because the driver keeps its old state.

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::app::ports::GpioPort;
use crate::drivers::buzzer::BuzzerDriver;
use crate::state::SharedDetectionState;

use super::{run_loop, TaskReport};

pub const NAME: &str = "actuator";

pub struct ActuatorControl<G> {
    buzzer: BuzzerDriver<G>,
    state: Arc<SharedDetectionState>,
    period: Duration,
    write_failures: u64,
}

impl<G: GpioPort> ActuatorControl<G> {
    pub fn new(gpio: G, output_pin: u32, state: Arc<SharedDetectionState>, period: Duration) -> Self {
        Self {
            buzzer: BuzzerDriver::new(gpio, output_pin),
            state,
            period,
            write_failures: 0,
        }
    }

    /// One control cycle.  Returns `true` if a write was issued successfully.
    pub fn step(&mut self) -> bool {
        let fire = self.state.fire_detected();
        match self.buzzer.apply(fire) {
            Ok(wrote) => wrote,
            Err(e) => {
                self.write_failures += 1;
                warn!("actuator: {}, retrying next cycle", e);
                false
            }
        }
    }

    pub fn buzzer(&self) -> &BuzzerDriver<G> {
        &self.buzzer
    }

    pub fn run(mut self) -> TaskReport {
        let state = Arc::clone(&self.state);
        let period = self.period;
        let cycles = run_loop(&state, || {
            self.step();
            period
        });
        TaskReport {
            name: NAME,
            cycles,
            io_failures: self.write_failures,
            writes: self.buzzer.writes(),
        }
    }
}
