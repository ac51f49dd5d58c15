//! Shared test doubles: inspectable pins, a recording timer, and a
//! pre-wired axis rig driven by manual timer pumping.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use embedded_hal::digital::{ErrorType, OutputPin};
use stepdrive::axis::{StepperAxis, StepperAxisBuilder};
use stepdrive::config::AxisConfig;
use stepdrive::platform::StepTimer;

#[derive(Default)]
struct PinLog {
    level: bool,
    rises: u32,
}

/// Output pin whose clones share one observable state.
#[derive(Clone, Default)]
pub struct SharedPin {
    state: Arc<Mutex<PinLog>>,
}

impl SharedPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.state.lock().unwrap().level
    }

    /// Number of low-to-high transitions, i.e. pulses on a step line.
    pub fn rise_count(&self) -> u32 {
        self.state.lock().unwrap().rises
    }
}

impl ErrorType for SharedPin {
    type Error = Infallible;
}

impl OutputPin for SharedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.state.lock().unwrap().level = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut log = self.state.lock().unwrap();
        if !log.level {
            log.rises += 1;
        }
        log.level = true;
        Ok(())
    }
}

#[derive(Default)]
struct TimerLog {
    arms: Vec<u64>,
    cancels: u32,
}

/// Timer that records arm periods instead of firing; tests pump the
/// axis by calling `on_step_timer` themselves.
#[derive(Clone, Default)]
pub struct RecordingTimer {
    state: Arc<Mutex<TimerLog>>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm_periods(&self) -> Vec<u64> {
        self.state.lock().unwrap().arms.clone()
    }

    pub fn arm_count(&self) -> usize {
        self.state.lock().unwrap().arms.len()
    }

    pub fn cancel_count(&self) -> u32 {
        self.state.lock().unwrap().cancels
    }
}

impl StepTimer for RecordingTimer {
    fn arm(&mut self, delay_micros: u64) {
        self.state.lock().unwrap().arms.push(delay_micros);
    }

    fn cancel(&mut self) {
        self.state.lock().unwrap().cancels += 1;
    }
}

pub type TestAxis = StepperAxis<SharedPin, SharedPin, SharedPin, RecordingTimer>;

/// An axis built on the shared doubles, with side handles kept open.
pub struct Rig {
    pub axis: TestAxis,
    pub enable_pin: SharedPin,
    pub step_pin: SharedPin,
    pub dir_pin: SharedPin,
    pub timer: RecordingTimer,
}

pub fn rig_with(config: AxisConfig) -> Rig {
    let enable_pin = SharedPin::new();
    let step_pin = SharedPin::new();
    let dir_pin = SharedPin::new();
    let timer = RecordingTimer::new();

    let axis = StepperAxisBuilder::new(
        enable_pin.clone(),
        step_pin.clone(),
        dir_pin.clone(),
        timer.clone(),
    )
    .config(config)
    .build()
    .unwrap();

    Rig {
        axis,
        enable_pin,
        step_pin,
        dir_pin,
        timer,
    }
}

pub fn rig() -> Rig {
    rig_with(AxisConfig::with_steps_per_revolution(200))
}

/// Drive the in-flight travel to completion by simulating timer expiries.
pub fn pump_to_completion(axis: &TestAxis) {
    let mut guard = 0u32;
    while axis.is_traveling() {
        axis.on_step_timer();
        guard += 1;
        assert!(guard < 2_000_000, "travel never completed");
    }
}

/// Simulate exactly `count` timer expiries.
pub fn pump_ticks(axis: &TestAxis, count: u32) {
    for _ in 0..count {
        axis.on_step_timer();
    }
}
