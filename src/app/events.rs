//! Outbound status reports.
//!
//! The status reporter task emits these through the
//! [`StatusSink`](super::ports::StatusSink) port.

use crate::state::DetectionSnapshot;

/// A point-in-time view of the monitor suitable for logging or display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Monotonic report number, starting at 1.
    pub seq: u64,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub any_pin_high: bool,
    pub fire_detected: bool,
    /// Cause bitmask (see `FireCause::mask()`).
    pub causes: u8,
    /// Termination has been requested.
    pub terminating: bool,
}

impl StatusReport {
    pub fn from_snapshot(seq: u64, snap: &DetectionSnapshot) -> Self {
        Self {
            seq,
            temperature_c: snap.temperature_c,
            humidity_pct: snap.humidity_pct,
            any_pin_high: snap.any_pin_high,
            fire_detected: snap.fire_detected,
            causes: snap.causes,
            terminating: snap.terminating,
        }
    }
}
