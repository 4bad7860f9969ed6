//! Buzzer driver, startup pin configuration and task thread spawning.

pub mod buzzer;
pub mod pin_setup;
pub mod rt_thread;
