//! One-shot GPIO configuration at startup.
//!
//! Exports every detector input and the buzzer output and sets their
//! directions.  Each pin is retried under the configured [`RetryPolicy`]:
//! the default policy never gives up, so startup blocks until the kernel
//! makes the line available.  A bounded policy turns the stall into a
//! reportable [`SetupError::PinConfig`].
//!
//! Backoff sleeps go through [`SharedDetectionState::sleep`], so a
//! termination request during startup ends the retry loop at once.

use log::{info, warn};

use crate::app::ports::{Direction, GpioPort, Level};
use crate::config::RetryPolicy;
use crate::error::{GpioError, SetupError};
use crate::pins::PinSet;
use crate::state::SharedDetectionState;

/// Configure every pin of `pins`: inputs first, in order, then the output.
/// The output is driven low once its direction is set.
pub fn configure_all<G: GpioPort + ?Sized>(
    gpio: &G,
    pins: &PinSet,
    policy: &RetryPolicy,
    state: &SharedDetectionState,
) -> Result<(), SetupError> {
    for &pin in pins.inputs() {
        configure_pin(gpio, pin, Direction::In, policy, state)?;
    }
    configure_pin(gpio, pins.output(), Direction::Out, policy, state)?;
    info!(
        "pin_setup: {} inputs + output GPIO{} configured",
        pins.inputs().len(),
        pins.output()
    );
    Ok(())
}

/// Export `pin` and set its direction, retrying per `policy`.
/// Returns the number of attempts it took.
pub fn configure_pin<G: GpioPort + ?Sized>(
    gpio: &G,
    pin: u32,
    direction: Direction,
    policy: &RetryPolicy,
    state: &SharedDetectionState,
) -> Result<u32, SetupError> {
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let last = match try_configure(gpio, pin, direction) {
            Ok(()) => {
                if attempts > 1 {
                    info!("pin_setup: GPIO{} ({}) ready after {} attempts", pin, direction.as_str(), attempts);
                }
                return Ok(attempts);
            }
            Err(e) => e,
        };

        if policy.exhausted(attempts) {
            return Err(SetupError::PinConfig { pin, attempts, last });
        }
        let delay = policy.delay_after(attempts);
        warn!("pin_setup: {} (attempt {}), retrying in {:?}", last, attempts, delay);
        if state.sleep(delay) {
            return Err(SetupError::Interrupted);
        }
    }
}

fn try_configure<G: GpioPort + ?Sized>(gpio: &G, pin: u32, direction: Direction) -> Result<(), GpioError> {
    gpio.export(pin)?;
    gpio.set_direction(pin, direction)?;
    if direction == Direction::Out {
        gpio.write(pin, Level::Low)?;
    }
    Ok(())
}
