//! Status reporter: periodic read-only snapshot of the shared state.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::app::events::StatusReport;
use crate::app::ports::StatusSink;
use crate::state::SharedDetectionState;

use super::{run_loop, TaskReport};

pub const NAME: &str = "status";

pub struct StatusReporter<S> {
    sink: S,
    state: Arc<SharedDetectionState>,
    period: Duration,
    seq: u64,
}

impl<S: StatusSink> StatusReporter<S> {
    pub fn new(sink: S, state: Arc<SharedDetectionState>, period: Duration) -> Self {
        Self {
            sink,
            state,
            period,
            seq: 0,
        }
    }

    pub fn report_once(&mut self) -> StatusReport {
        self.seq += 1;
        let report = StatusReport::from_snapshot(self.seq, &self.state.snapshot());
        self.sink.emit(&report);
        report
    }

    pub fn run(mut self) -> TaskReport {
        info!("Displaying system status every {:?}", self.period);
        let state = Arc::clone(&self.state);
        let period = self.period;
        let cycles = run_loop(&state, || {
            self.report_once();
            period
        });
        TaskReport {
            name: NAME,
            cycles,
            io_failures: 0,
            writes: 0,
        }
    }
}
