//! Full lifecycle runs through the Supervisor on real threads.

use std::sync::Arc;
use std::time::Duration;

use super::rig::{RecordingSink, fast_config, wait_until};

use firemon::adapters::sim::{SimClimate, SimGpio};
use firemon::app::ports::{Direction, Level};
use firemon::error::{Error, SetupError};
use firemon::pins::{BUZZER_GPIO, FLAME_INPUT_GPIOS};
use firemon::supervisor::Supervisor;

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn startup_configures_every_pin() {
    let gpio = Arc::new(SimGpio::new());
    let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
    sup.configure_pins().unwrap();

    for pin in FLAME_INPUT_GPIOS {
        assert!(gpio.is_exported(pin));
        assert_eq!(gpio.direction(pin), Some(Direction::In));
    }
    assert_eq!(gpio.direction(BUZZER_GPIO), Some(Direction::Out));
    assert_eq!(gpio.writes(BUZZER_GPIO), vec![Level::Low]);
}

#[test]
fn shutdown_during_fire_leaves_buzzer_off() {
    let gpio = Arc::new(SimGpio::new());
    let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
    let shutdown = sup.shutdown_handle();
    let sink = RecordingSink::default();

    let reports = std::thread::scope(|s| {
        let run = s.spawn(|| sup.run(SimClimate::new(24.0, 40.0), sink.clone()));

        gpio.set_level(69, Level::High);
        assert!(
            wait_until(TIMEOUT, || gpio.level(BUZZER_GPIO) == Level::High),
            "buzzer never turned on"
        );
        assert!(
            wait_until(TIMEOUT, || sink.0.lock().unwrap().iter().any(|r| r.fire_detected)),
            "status never reported the fire"
        );
        shutdown.request_termination("test");
        run.join().unwrap()
    })
    .unwrap();

    assert_eq!(reports.len(), 4);
    assert_eq!(gpio.level(BUZZER_GPIO), Level::Low);
    assert_eq!(gpio.writes(BUZZER_GPIO).last(), Some(&Level::Low));
    assert!(shutdown.shutdown_runs() >= 2, "signal path and post-join path");
}

#[test]
fn repeated_termination_requests_are_harmless() {
    let gpio = Arc::new(SimGpio::new());
    let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
    let shutdown = sup.shutdown_handle();

    let reports = std::thread::scope(|s| {
        let run = s.spawn(|| sup.run(SimClimate::new(24.0, 40.0), RecordingSink::default()));
        assert!(wait_until(TIMEOUT, || gpio.direction(BUZZER_GPIO).is_some()));
        for _ in 0..3 {
            shutdown.request_termination("test");
        }
        run.join().unwrap()
    })
    .unwrap();

    assert_eq!(reports.len(), 4);
    assert!(gpio.writes(BUZZER_GPIO).iter().skip(1).all(|l| *l == Level::Low));
    assert_eq!(gpio.level(BUZZER_GPIO), Level::Low);
}

#[test]
fn stalled_pin_blocks_until_terminated() {
    let gpio = Arc::new(SimGpio::new());
    gpio.fail_setup(67, u32::MAX);
    let sup = Supervisor::new(fast_config(), Arc::clone(&gpio));
    let shutdown = sup.shutdown_handle();

    let reports = std::thread::scope(|s| {
        let run = s.spawn(|| sup.run(SimClimate::new(24.0, 40.0), RecordingSink::default()));
        std::thread::sleep(Duration::from_millis(30));
        assert!(!run.is_finished(), "unbounded policy keeps retrying");
        shutdown.request_termination("test");
        run.join().unwrap()
    })
    .unwrap();

    assert!(reports.is_empty());
    assert!(!gpio.is_exported(67));
    assert_eq!(gpio.level(BUZZER_GPIO), Level::Low);
}

#[test]
fn bounded_policy_gives_up() {
    let gpio = Arc::new(SimGpio::new());
    gpio.fail_setup(BUZZER_GPIO, u32::MAX);
    let mut cfg = fast_config();
    cfg.pin_setup.max_attempts = Some(3);
    let sup = Supervisor::new(cfg, Arc::clone(&gpio));

    let err = sup.run(SimClimate::new(24.0, 40.0), RecordingSink::default()).unwrap_err();
    match err {
        Error::Setup(SetupError::PinConfig { pin, attempts, .. }) => {
            assert_eq!(pin, BUZZER_GPIO);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}
