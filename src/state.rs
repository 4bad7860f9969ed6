//! Shared detection state: the only mutable record the tasks share.
//!
//! Every task holds an `Arc<SharedDetectionState>`.  The record itself sits
//! behind a `Mutex` so no reader can see a half-updated temperature/humidity
//! pair; the termination flag is a separate atomic so the hot check at the
//! top of each task loop never contends for the lock.  A `Condvar` on the
//! same mutex lets the Supervisor cut a task's periodic sleep short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::app::ports::ClimateReading;
use crate::detection::{self, FireCause};

#[derive(Debug, Default)]
struct Record {
    any_pin_high: bool,
    causes: u8,
    temperature_c: f32,
    humidity_pct: f32,
}

/// Copy of the record taken under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectionSnapshot {
    pub any_pin_high: bool,
    pub fire_detected: bool,
    /// Cause bitmask (see `FireCause::mask()`).
    pub causes: u8,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub terminating: bool,
}

pub struct SharedDetectionState {
    record: Mutex<Record>,
    terminate: AtomicBool,
    wake: Condvar,
}

impl Default for SharedDetectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedDetectionState {
    /// All fields zeroed / false.
    pub fn new() -> Self {
        Self {
            record: Mutex::new(Record::default()),
            terminate: AtomicBool::new(false),
            wake: Condvar::new(),
        }
    }

    // A task that panicked mid-update leaves plain-old-data behind; keep going.
    fn lock(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the digital monitor's cycle result.  Touches only the
    /// digital cause.  Returns the resulting `fire_detected`.
    pub fn publish_digital(&self, any_pin_high: bool) -> bool {
        let (changed, causes) = {
            let mut rec = self.lock();
            rec.any_pin_high = any_pin_high;
            let changed = detection::eval_cause(&mut rec.causes, FireCause::DigitalInput, any_pin_high);
            (changed, rec.causes)
        };
        if changed {
            detection::log_cause_change(FireCause::DigitalInput, any_pin_high, causes);
        }
        causes != 0
    }

    /// Publish a **valid** climate reading and re-evaluate the climate
    /// cause against `threshold_c`.  Returns the resulting `fire_detected`.
    pub fn publish_climate(&self, reading: ClimateReading, threshold_c: f32) -> bool {
        let hot = detection::over_threshold(reading.temperature_c, threshold_c);
        let (changed, causes) = {
            let mut rec = self.lock();
            rec.temperature_c = reading.temperature_c;
            rec.humidity_pct = reading.humidity_pct;
            let changed = detection::eval_cause(&mut rec.causes, FireCause::OverTemperature, hot);
            (changed, rec.causes)
        };
        if changed {
            detection::log_cause_change(FireCause::OverTemperature, hot, causes);
        }
        causes != 0
    }

    pub fn fire_detected(&self) -> bool {
        self.lock().causes != 0
    }

    pub fn snapshot(&self) -> DetectionSnapshot {
        let rec = self.lock();
        DetectionSnapshot {
            any_pin_high: rec.any_pin_high,
            fire_detected: rec.causes != 0,
            causes: rec.causes,
            temperature_c: rec.temperature_c,
            humidity_pct: rec.humidity_pct,
            terminating: self.is_terminating(),
        }
    }

    // ── Termination ───────────────────────────────────────────────

    /// Set the termination flag and wake every sleeping task.
    /// Returns `true` only for the call that performed the false→true
    /// transition.
    pub fn request_terminate(&self) -> bool {
        let first = {
            // Flip under the lock so a task between its predicate check and
            // its wait cannot miss the notification.
            let _rec = self.lock();
            !self.terminate.swap(true, Ordering::AcqRel)
        };
        self.wake.notify_all();
        first
    }

    pub fn is_terminating(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Sleep for `period` or until termination is requested, whichever
    /// comes first.  Returns `true` if the caller should stop.
    pub fn sleep(&self, period: Duration) -> bool {
        let rec = self.lock();
        let _ = self
            .wake
            .wait_timeout_while(rec, period, |_| !self.terminate.load(Ordering::Acquire))
            .unwrap_or_else(PoisonError::into_inner);
        self.is_terminating()
    }
}
