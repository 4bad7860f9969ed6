//! Fire-cause evaluation.
//!
//! `fire_detected` is not stored as a plain flag.  Each independent
//! detector owns one bit of a cause bitmask, and fire is detected while
//! **any** bit is set.  An updater may only set or clear its own bit, so
//! the digital monitor can never clear a climate assertion or the other
//! way round.
//!
//! ## Cause lifecycle
//!
//! 1. A detector observes its condition (pin high, temperature above
//!    threshold).
//! 2. It sets its bit via [`eval_cause`].
//! 3. The actuator task sees `fire_detected` and sounds the buzzer.
//! 4. When the detector's own condition clears, it clears only its bit.
//! 5. The buzzer stops once the mask is zero.

use core::fmt;

use log::{info, warn};

/// Independent reasons for a fire-detected condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FireCause {
    /// At least one digital flame/smoke input reads HIGH.
    DigitalInput = 0b0000_0001,
    /// Last valid temperature sample is above the threshold.
    OverTemperature = 0b0000_0010,
}

impl FireCause {
    /// Return the bitmask for this cause.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FireCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DigitalInput => write!(f, "digital input high"),
            Self::OverTemperature => write!(f, "over temperature"),
        }
    }
}

/// Set or clear `cause` in `causes` based on `condition`.
/// Returns `true` if the bit changed.
pub fn eval_cause(causes: &mut u8, cause: FireCause, condition: bool) -> bool {
    let before = *causes;
    if condition {
        *causes |= cause.mask();
    } else {
        *causes &= !cause.mask();
    }
    before != *causes
}

/// Log a cause transition reported by [`eval_cause`].
pub fn log_cause_change(cause: FireCause, asserted: bool, causes: u8) {
    if asserted {
        warn!("FIRE CAUSE SET: {cause} (causes=0b{causes:02b})");
    } else {
        info!("FIRE CAUSE CLEARED: {cause} (causes=0b{causes:02b})");
    }
}

/// True if the climate cause should be asserted for `temperature_c`.
pub fn over_threshold(temperature_c: f32, threshold_c: f32) -> bool {
    temperature_c > threshold_c
}
