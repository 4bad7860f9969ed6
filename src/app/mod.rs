//! Application boundary: port traits and the values that cross them.
//!
//! All interaction with hardware happens through the **port traits**
//! defined in [`ports`], keeping the tasks and the Supervisor fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
