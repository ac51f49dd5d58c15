//! End-to-end runs on the host platform adapters: a real worker-thread
//! timer paces the steps while the test thread blocks on the waits.

mod common;

use std::time::Duration;

use common::SharedPin;
use stepdrive::axis::StepperAxisBuilder;
use stepdrive::config::AxisConfig;
use stepdrive::platform::host::{ManualInput, ThreadTimer};
use stepdrive::{Direction, Edge, UnitExt};

fn fast_config() -> AxisConfig {
    // Step periods between 100 µs and 500 µs keep the runs short.
    let mut config = AxisConfig::with_steps_per_revolution(200);
    config.max_rps = 50.0.rps();
    config.min_rps = 10.0.rps();
    config.rpss = 100.0.rpss();
    config
}

#[test]
fn travel_completes_under_the_thread_timer() {
    let (timer, hook) = ThreadTimer::spawn();
    let step_pin = SharedPin::new();
    let axis = StepperAxisBuilder::new(
        SharedPin::new(),
        step_pin.clone(),
        SharedPin::new(),
        timer,
    )
    .config(fast_config())
    .build()
    .unwrap();
    let pump = axis.clone();
    hook.connect(move || pump.on_step_timer());

    axis.rotate(180.0.degrees(), Direction::Clockwise).unwrap();
    axis.wait_for_travel_end(Some(Duration::from_secs(5)))
        .unwrap();

    assert_eq!(axis.current_step(), 100);
    assert_eq!(step_pin.rise_count(), 100);
    assert!(!axis.is_traveling());
}

#[test]
fn back_to_back_travels_settle_at_the_commanded_angle() {
    let (timer, hook) = ThreadTimer::spawn();
    let axis = StepperAxisBuilder::new(
        SharedPin::new(),
        SharedPin::new(),
        SharedPin::new(),
        timer,
    )
    .config(fast_config())
    .build()
    .unwrap();
    let pump = axis.clone();
    hook.connect(move || pump.on_step_timer());

    axis.rotate_to(90.0.degrees()).unwrap();
    axis.wait_for_travel_end(None).unwrap();
    axis.rotate_to(270.0.degrees()).unwrap();
    axis.wait_for_travel_end(None).unwrap();

    let angle = axis.degrees().unwrap().value();
    assert!((angle - 270.0).abs() < 1.8 + 1e-3);
}

#[test]
fn homing_end_to_end_with_a_triggered_switch() {
    let (timer, hook) = ThreadTimer::spawn();
    let axis = StepperAxisBuilder::new(
        SharedPin::new(),
        SharedPin::new(),
        SharedPin::new(),
        timer,
    )
    .config(fast_config())
    .build()
    .unwrap();
    let pump = axis.clone();
    hook.connect(move || pump.on_step_timer());

    let mut input = ManualInput::new();
    let switch = input.clone();
    axis.register_endstop(&mut input).unwrap();

    let helper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        switch.trigger(Edge::Rise);
    });

    axis.home(Duration::from_secs(2), Direction::Anticlockwise)
        .unwrap();
    helper.join().unwrap();

    assert_eq!(axis.current_step(), 0);
    assert_eq!(axis.last_endstop_hit(), None);
    assert!(!axis.is_traveling());
}
