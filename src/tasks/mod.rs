//! The four periodic monitor tasks.
//!
//! | Task            | Tier   | Period            | Writes to shared state          |
//! |-----------------|--------|-------------------|---------------------------------|
//! | `digital_input` | Medium | 1 tick            | any_pin_high, digital cause     |
//! | `climate`       | High   | 5 ticks / 1 retry | temp, humidity, climate cause   |
//! | `actuator`      | Low    | 1 tick            | none (drives the buzzer pin)    |
//! | `status`        | Low    | 2 ticks           | none (read only)                |
//!
//! Each task owns its hardware handle and shares only the
//! [`SharedDetectionState`].  Every task body is a single-cycle method
//! (`poll_once`, `attempt`, `step`, `report_once`) wrapped by
//! [`run_loop`], which checks the termination flag at the top of every
//! cycle and sleeps on the state's condvar between cycles.

pub mod actuator;
pub mod climate;
pub mod digital_input;
pub mod status;

use std::time::Duration;

use crate::state::SharedDetectionState;

/// What a task hands back to the Supervisor when it joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskReport {
    pub name: &'static str,
    /// Completed cycles.
    pub cycles: u64,
    /// Transient I/O failures absorbed (read, write or sensor).
    pub io_failures: u64,
    /// GPIO writes issued (actuator only).
    pub writes: u64,
}

/// Run `cycle` until termination is requested.  `cycle` returns how long
/// to sleep before the next one.  Returns the number of completed cycles.
pub fn run_loop(state: &SharedDetectionState, mut cycle: impl FnMut() -> Duration) -> u64 {
    let mut cycles = 0u64;
    while !state.is_terminating() {
        let wait = cycle();
        cycles += 1;
        if state.sleep(wait) {
            break;
        }
    }
    cycles
}
