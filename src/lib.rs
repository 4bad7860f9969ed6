//! firemon library.
//!
//! Exposes the detection core, the task bodies and the adapters for
//! integration testing.  Hardware access goes through the port traits in
//! [`app::ports`], so everything except the sysfs/IIO adapters runs on any
//! host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod detection;
pub mod error;
pub mod pins;
pub mod state;
pub mod supervisor;
pub mod tasks;

pub mod adapters;
pub mod drivers;
