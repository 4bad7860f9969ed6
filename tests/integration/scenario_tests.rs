//! Detection scenarios on the factory pin set, stepped deterministically.

use super::rig::Rig;

use firemon::app::ports::Level;
use firemon::detection::FireCause;

#[test]
fn quiet_room_no_fire_buzzer_off() {
    let mut rig = Rig::new(25.0);
    rig.poll_pins();
    rig.sample();
    for _ in 0..5 {
        rig.poll_pins();
    }

    assert!(!rig.state.fire_detected());
    assert!(!rig.buzzer_on());
    assert!(rig.buzzer_writes().is_empty(), "no transition, no write");
}

#[test]
fn flame_on_pin_67_turns_buzzer_on_once() {
    let mut rig = Rig::new(25.0);
    rig.sample();
    rig.gpio.set_level(67, Level::High);
    for _ in 0..5 {
        rig.poll_pins();
    }

    let snap = rig.state.snapshot();
    assert!(snap.any_pin_high);
    assert!(snap.fire_detected);
    assert_eq!(snap.causes, FireCause::DigitalInput.mask());
    assert_eq!(rig.buzzer_writes(), vec![Level::High]);
}

#[test]
fn heat_keeps_fire_after_flame_clears() {
    let mut rig = Rig::new(25.0);
    rig.gpio.set_level(67, Level::High);
    rig.poll_pins();
    rig.sensor.set_steady(30.0, 40.0);
    rig.sample();

    rig.gpio.set_level(67, Level::Low);
    rig.poll_pins();
    rig.poll_pins();

    let snap = rig.state.snapshot();
    assert!(!snap.any_pin_high);
    assert!(snap.fire_detected, "30.0 °C alone is a fire");
    assert_eq!(snap.causes, FireCause::OverTemperature.mask());
    assert_eq!(rig.buzzer_writes(), vec![Level::High], "buzzer stays on without rewrites");
}

#[test]
fn fire_clears_only_after_successful_cool_read() {
    let mut rig = Rig::new(30.0);
    rig.sample();
    rig.poll_pins();
    assert!(rig.state.fire_detected());

    rig.sensor.push_failures(3);
    rig.sensor.set_steady(20.0, 40.0);
    for _ in 0..3 {
        assert!(!rig.sample().is_valid());
        rig.poll_pins();
        assert!(rig.state.fire_detected(), "failed reads must not clear the fire");
        assert!(rig.buzzer_on());
    }

    assert!(rig.sample().is_valid());
    rig.poll_pins();
    assert!(!rig.state.fire_detected());
    assert!(!rig.buzzer_on());
    assert_eq!(rig.buzzer_writes(), vec![Level::High, Level::Low]);
}

#[test]
fn threshold_is_strict() {
    let mut rig = Rig::new(29.0);
    rig.sample();
    assert!(!rig.state.fire_detected());

    rig.sensor.set_steady(29.1, 40.0);
    rig.sample();
    assert!(rig.state.fire_detected());
}

#[test]
fn both_causes_need_to_clear() {
    let mut rig = Rig::new(35.0);
    rig.gpio.set_level(45, Level::High);
    rig.poll_pins();
    rig.sample();
    assert_eq!(
        rig.state.snapshot().causes,
        FireCause::DigitalInput.mask() | FireCause::OverTemperature.mask()
    );

    rig.sensor.set_steady(21.0, 40.0);
    rig.sample();
    assert!(rig.state.fire_detected(), "flame still present");

    rig.gpio.set_level(45, Level::Low);
    rig.poll_pins();
    assert!(!rig.state.fire_detected());
    assert_eq!(rig.buzzer_writes(), vec![Level::High, Level::Low]);
}

#[test]
fn unreadable_pin_does_not_hide_other_flames() {
    let mut rig = Rig::new(22.0);
    rig.gpio.fail_reads(66, 10);
    rig.gpio.set_level(68, Level::High);
    rig.poll_pins();
    assert!(rig.state.fire_detected());
    assert_eq!(rig.digital.read_failures(), 1);
}
