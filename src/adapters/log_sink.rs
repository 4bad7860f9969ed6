//! Log-based status sink adapter.
//!
//! Implements [`StatusSink`] by writing each status report to the `log`
//! facade (stderr via `env_logger` in the binary).  A display or LCD
//! adapter would implement the same trait.

use log::info;

use crate::app::events::StatusReport;
use crate::app::ports::StatusSink;

/// Adapter that logs every [`StatusReport`] on one line.
#[derive(Debug, Default)]
pub struct LogStatusSink;

impl LogStatusSink {
    pub fn new() -> Self {
        Self
    }
}

impl StatusSink for LogStatusSink {
    fn emit(&mut self, report: &StatusReport) {
        info!("{}", format_report(report));
    }
}

/// Render a report as the one-line `STATUS | ...` record.
pub fn format_report(r: &StatusReport) -> String {
    format!(
        "STATUS #{} | T={:.2}\u{00b0}C | RH={:.2}% | inputs={} | fire={} | causes=0b{:02b} | {}",
        r.seq,
        r.temperature_c,
        r.humidity_pct,
        if r.any_pin_high { "HIGH" } else { "low" },
        if r.fire_detected { "YES" } else { "no" },
        r.causes,
        if r.terminating { "STOPPING" } else { "running" },
    )
}
