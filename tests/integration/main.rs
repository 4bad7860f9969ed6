//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the monitor against the
//! simulation adapters.  All tests run on the host with no real hardware.

mod rig;
mod scenario_tests;
mod shutdown_tests;
